//! Graphviz output for debugging tree shapes.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::types::LinkNode;
use crate::util::{get_l, get_p, get_r};

/// Writes the tree rooted at `root` as a Graphviz digraph: one
/// `id [color=… label="…"]` line per node (the id is the arena index) and a
/// `parent -> child [label="L"|"R"]` edge per link.
pub fn write_dot<N, W, FL, FC>(
    arena: &[N],
    root: Option<u32>,
    out: &mut W,
    label: FL,
    color: FC,
) -> io::Result<()>
where
    N: LinkNode,
    W: Write,
    FL: Fn(&N) -> String,
    FC: Fn(&N) -> &'static str,
{
    writeln!(out, "digraph G {{")?;

    let mut stack = Vec::new();
    if let Some(root) = root {
        stack.push(root);
    }
    while let Some(i) = stack.pop() {
        let node = &arena[i as usize];
        writeln!(out, "  {} [color={} label=\"{}\"]", i, color(node), label(node))?;

        if let Some(p) = get_p(arena, i) {
            let side = if get_l(arena, p) == Some(i) { "L" } else { "R" };
            writeln!(out, "  {} -> {} [label=\"{}\"]", p, i, side)?;
        }

        if let Some(r) = get_r(arena, i) {
            stack.push(r);
        }
        if let Some(l) = get_l(arena, i) {
            stack.push(l);
        }
    }

    writeln!(out, "}}")
}

/// Writes the digraph to a file.
pub fn dump_to_dot<N, FL, FC, P>(
    arena: &[N],
    root: Option<u32>,
    path: P,
    label: FL,
    color: FC,
) -> io::Result<()>
where
    N: LinkNode,
    P: AsRef<Path>,
    FL: Fn(&N) -> String,
    FC: Fn(&N) -> &'static str,
{
    let mut out = BufWriter::new(File::create(path)?);
    write_dot(arena, root, &mut out, label, color)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bare {
        p: Option<u32>,
        l: Option<u32>,
        r: Option<u32>,
    }

    impl LinkNode for Bare {
        fn p(&self) -> Option<u32> {
            self.p
        }
        fn l(&self) -> Option<u32> {
            self.l
        }
        fn r(&self) -> Option<u32> {
            self.r
        }
        fn set_p(&mut self, v: Option<u32>) {
            self.p = v;
        }
        fn set_l(&mut self, v: Option<u32>) {
            self.l = v;
        }
        fn set_r(&mut self, v: Option<u32>) {
            self.r = v;
        }
    }

    #[test]
    fn dot_lists_every_node_and_edge() {
        // 1 is the root with children 0 (left) and 2 (right).
        let arena = vec![
            Bare {
                p: Some(1),
                l: None,
                r: None,
            },
            Bare {
                p: None,
                l: Some(0),
                r: Some(2),
            },
            Bare {
                p: Some(1),
                l: None,
                r: None,
            },
        ];

        let mut out = Vec::new();
        write_dot(&arena, Some(1), &mut out, |_| "x".to_string(), |_| "black").unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("digraph G {"));
        assert!(text.contains("1 [color=black label=\"x\"]"));
        assert!(text.contains("1 -> 0 [label=\"L\"]"));
        assert!(text.contains("1 -> 2 [label=\"R\"]"));
        assert!(text.trim_end().ends_with('}'));
    }
}

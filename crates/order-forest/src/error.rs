use thiserror::Error;

/// Structural-invariant violations reported by the `verify` family.
///
/// Mutating operations have no recoverable error path; these are only ever
/// produced by the explicit checkers, which inspect without mutating.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("node {node} reached more than once during traversal")]
    Cycle { node: u32 },
    #[error("child {child} does not point back to parent {parent}")]
    BrokenParentLink { parent: u32, child: u32 },
    #[error("root {root} has a parent link")]
    RootHasParent { root: u32 },
    #[error("keys out of order around node {node}")]
    OrderViolation { node: u32 },
    #[error("root {root} is red")]
    RootNotBlack { root: u32 },
    #[error("red node {node} has a red child")]
    RedRed { node: u32 },
    #[error("black height differs between children of node {node}")]
    BlackHeightMismatch { node: u32 },
    #[error("equality chain broken at node {node}")]
    ChainBroken { node: u32 },
    #[error("rank discipline violated at node {node}")]
    RankViolation { node: u32 },
    #[error("subtree size wrong at node {node}")]
    SizeMismatch { node: u32 },
    #[error("energy exceeds the rebuild threshold at node {node}")]
    EnergyOverflow { node: u32 },
    #[error("cached interval maximum wrong at node {node}")]
    MaxUpperMismatch { node: u32 },
}

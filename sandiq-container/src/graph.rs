//! Resolution path tracking.
//!
//! Resolution is a depth-first walk of the dependency graph, discovered
//! lazily as constructors ask for their parameters. [`ResolutionPath`] is
//! the walk's stack: it detects cycles (an identifier requested while it is
//! still being resolved), caps the depth, and provides the chain shown in
//! error messages.

use tracing::warn;

use crate::error::{CircularDependencyError, SandiqError};
use crate::key::Identifier;

/// Stack of identifiers currently being resolved, outermost first.
#[derive(Debug)]
pub(crate) struct ResolutionPath {
    stack: Vec<Identifier>,
    max_depth: usize,
}

impl ResolutionPath {
    pub fn new(max_depth: usize) -> Self {
        Self {
            stack: Vec::new(),
            max_depth,
        }
    }

    /// Pushes `id`, failing on a cycle or when the path is too deep.
    ///
    /// Nothing is pushed on failure; callers only [`leave`](Self::leave)
    /// after a successful `enter`.
    pub fn enter(&mut self, id: &str) -> Result<(), SandiqError> {
        if let Some(start) = self.stack.iter().position(|k| k.as_str() == id) {
            let mut chain: Vec<Identifier> = self.stack[start..].to_vec();
            chain.push(Identifier::new(id.to_string()));

            warn!(cycle = ?chain, "Circular dependency detected!");

            return Err(SandiqError::CircularDependency(CircularDependencyError {
                chain,
            }));
        }

        if self.stack.len() >= self.max_depth {
            warn!(id, limit = self.max_depth, "Resolution depth limit reached");
            return Err(SandiqError::DepthExceeded {
                id: Identifier::new(id.to_string()),
                limit: self.max_depth,
            });
        }

        self.stack.push(Identifier::new(id.to_string()));
        Ok(())
    }

    pub fn leave(&mut self) {
        self.stack.pop();
    }

    /// Snapshot of the current path.
    pub fn chain(&self) -> Vec<Identifier> {
        self.stack.clone()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_and_leave() {
        let mut path = ResolutionPath::new(8);
        path.enter("A").unwrap();
        path.enter("B").unwrap();
        assert_eq!(path.depth(), 2);
        assert_eq!(path.chain(), vec![Identifier::from("A"), Identifier::from("B")]);

        path.leave();
        path.leave();
        assert_eq!(path.depth(), 0);
    }

    #[test]
    fn detect_circular_dependency() {
        // A → B → C → B  (cycle!)
        let mut path = ResolutionPath::new(8);
        path.enter("A").unwrap();
        path.enter("B").unwrap();
        path.enter("C").unwrap();

        match path.enter("B") {
            Err(SandiqError::CircularDependency(err)) => {
                let chain: Vec<&str> = err.chain.iter().map(Identifier::as_str).collect();
                assert_eq!(chain, vec!["B", "C", "B"]);
            }
            other => panic!("Expected CircularDependency, got: {other:?}"),
        }

        // failed enter pushes nothing
        assert_eq!(path.depth(), 3);
    }

    #[test]
    fn detect_self_dependency() {
        let mut path = ResolutionPath::new(8);
        path.enter("A").unwrap();
        assert!(path.enter("A").is_err());
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        //     A
        //    / \
        //   B   C
        //    \ /
        //     D
        let mut path = ResolutionPath::new(8);
        path.enter("A").unwrap();
        path.enter("B").unwrap();
        path.enter("D").unwrap();
        path.leave();
        path.leave();
        path.enter("C").unwrap();
        assert!(path.enter("D").is_ok());
    }

    #[test]
    fn depth_limit() {
        let mut path = ResolutionPath::new(2);
        path.enter("A").unwrap();
        path.enter("B").unwrap();

        match path.enter("C") {
            Err(SandiqError::DepthExceeded { id, limit }) => {
                assert_eq!(id.as_str(), "C");
                assert_eq!(limit, 2);
            }
            other => panic!("Expected DepthExceeded, got: {other:?}"),
        }
    }
}

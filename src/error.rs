use super::half::Half;

quick_error! {
    #[derive(Debug)]
    pub enum Error {
        /// Resultant rank violates the triangular condition.
        InvalidCoupling { k1: Half<i32>, k2: Half<i32>, k: Half<i32> } {
            display("cannot couple {} and {} to {}", k1, k2, k)
        }
        /// Scalar and vector products require rank-1 operands.
        NotAVector { rank: Half<i32> } {
            display("expected a rank-1 operator, got rank {}", rank)
        }
        UnregisteredSubspace { name: String } {
            display("subspace {:?} is not registered", name)
        }
        /// A subspace occurs on both sides of a state coupling.
        IncompatibleSpaces { name: String } {
            display("subspace {:?} occurs on both sides of the coupling", name)
        }
        ShapeMismatch { reason: String } {
            display("malformed matrix element: {}", reason)
        }
        IncompleteAssignment { symbol: String } {
            display("no value assigned to {:?}", symbol)
        }
        NonIntegralPhase { phase: String } {
            display("phase {} is not an integral power of -1", phase)
        }
        Yaml(err: serde_yaml::Error) {
            from()
            source(err)
            display("{}", err)
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

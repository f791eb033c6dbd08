pub mod confidence;
pub mod orchestrator;
pub mod priority;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;
pub mod traversal;
pub mod urlnorm;

pub mod mocks;

pub use mocks::MockEncoder;

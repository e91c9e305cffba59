pub mod envelope;
pub mod handler;

pub use envelope::{SkillRequest, SkillResponse};
pub use handler::SkillHandler;

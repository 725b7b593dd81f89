pub mod delete_story;
pub mod new_story;
pub mod pull_request_story;
pub mod pull_story;
pub mod switch_story;

pub use delete_story::*;
pub use new_story::*;
pub use pull_request_story::*;
pub use pull_story::*;
pub use switch_story::*;

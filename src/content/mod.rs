//! Content module - post models, rich text and derived fields

mod post;
pub mod reading;
pub mod richtext;

pub use post::{ContentBlock, PostDetail, PostPage, PostSummary};
pub use reading::{reading_time, WORDS_PER_MINUTE};
pub use richtext::{RichText, RichTextBlock};

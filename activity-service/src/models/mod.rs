pub mod activity;
pub mod output;

pub use activity::{ActivityBucket, ActivityEvent, Timeframe, UsageDocument};
pub use output::{Attachment, FormattedOutput};

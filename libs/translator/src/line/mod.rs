pub mod inbound;
pub mod outbound;

pub use inbound::{decode, decode_reader};
pub use outbound::{
    LineAction, LineColumn, LineFragment, LineTemplate, MAX_ACTIONS_PER_COLUMN, MAX_COLUMNS,
    MAX_QUESTION_ACTIONS, carousel, question, reply_body, text,
};

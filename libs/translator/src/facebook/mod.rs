pub mod inbound;
pub mod outbound;

pub use inbound::{decode, decode_reader};
pub use outbound::{
    FacebookButton, FacebookFragment, GenericElement, MAX_TEMPLATE_ELEMENTS, QuickReply,
    TemplateAttachment, carousel, question, send_body, text,
};

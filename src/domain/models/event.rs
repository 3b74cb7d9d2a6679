use super::AIModelDescriptor;
use super::SendOutcome;

#[derive(Debug)]
pub enum Event {
    InputClosed(),
    InputLine(String),
    ModelsLoaded(Vec<AIModelDescriptor>),
    ModelsRefreshed(Vec<AIModelDescriptor>),
    ReplyReceived(SendOutcome),
}

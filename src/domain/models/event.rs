use tui_textarea::Input;

use super::AnalysisResult;
use super::Message;
use super::ModelResponse;

/// Events delivered to the UI loop, either from the background workers or
/// from the terminal.
pub enum Event {
    AnalysisFailed(String, String),
    AnalysisReady(String, AnalysisResult),
    HistorySnapshot(Vec<Message>),
    ModelUpdate(String, String, ModelResponse),
    StoreDisconnected(String),
    SubmitAccepted(String),
    SubmitFailed(String, String),
    KeyboardCharInput(Input),
    KeyboardCTRLC(),
    KeyboardEnter(),
    KeyboardPaste(String),
    UIScrollDown(),
    UIScrollUp(),
    UIScrollPageDown(),
    UIScrollPageUp(),
    UITick(),
}

//! Call-control document (NCCO) synthesis.
//!
//! An inbound-call webhook is answered with an ordered list of actions the
//! telephony platform executes. Only `talk` actions are produced here.
//!
//! The `to` number doubles as a debug channel: `ncco__talk__<text>` replaces
//! the greeting with `<text>`. [`CallInstruction::parse`] is the only place
//! that interprets that encoding; the greeting formatting never sees it.

use crate::observability::metrics::record_ncco_synthesized;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Separator between segments of an instruction-encoded number.
pub const INSTRUCTION_SEPARATOR: &str = "__";

/// Value used for `to`/`from` when the webhook omits them.
pub const UNKNOWN_PARTY: &str = "unknown";

const INSTRUCTION_PREFIX: &str = "ncco";
const TALK_INSTRUCTION: &str = "talk";

/// A single NCCO action.
///
/// Serializes as `{"action": "talk", "text": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum NccoAction {
    Talk { text: String },
}

/// Ordered, non-empty call-control document.
///
/// Serializes as a bare JSON array. There is no public constructor for an
/// empty document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Ncco(Vec<NccoAction>);

impl Ncco {
    /// Document holding exactly one action.
    pub fn single(action: NccoAction) -> Self {
        Ncco(vec![action])
    }

    /// Actions in execution order.
    pub fn actions(&self) -> &[NccoAction] {
        &self.0
    }
}

/// What an inbound call asked for, after decoding the `to` parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallInstruction {
    /// Ordinary call: greet the caller with both numbers spelled out.
    Greeting { to: String, from: String },
    /// `ncco__talk__<text>`: speak `<text>` verbatim.
    ExplicitTalk { text: String },
}

impl CallInstruction {
    /// Decode the raw webhook identifiers.
    ///
    /// `to` is split on [`INSTRUCTION_SEPARATOR`]. Segments `ncco`, `talk`
    /// select [`CallInstruction::ExplicitTalk`] with the third segment as
    /// text (empty when absent); further segments are ignored. Anything else
    /// is a [`CallInstruction::Greeting`]. No input is rejected.
    pub fn parse(to: &str, from: &str) -> Self {
        let mut segments = to.split(INSTRUCTION_SEPARATOR);

        match (segments.next(), segments.next()) {
            (Some(INSTRUCTION_PREFIX), Some(TALK_INSTRUCTION)) => CallInstruction::ExplicitTalk {
                text: segments.next().unwrap_or_default().to_string(),
            },
            _ => CallInstruction::Greeting {
                to: to.to_string(),
                from: from.to_string(),
            },
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CallInstruction::Greeting { .. } => "greeting",
            CallInstruction::ExplicitTalk { .. } => "explicit_talk",
        }
    }

    pub fn into_ncco(self) -> Ncco {
        let text = match self {
            CallInstruction::Greeting { to, from } => greeting_text(&to, &from),
            CallInstruction::ExplicitTalk { text } => text,
        };
        Ncco::single(NccoAction::Talk { text })
    }
}

/// Default greeting.
///
/// `to` is spelled with two spaces between characters and `from` with one,
/// so text-to-speech reads every digit out individually.
pub fn greeting_text(to: &str, from: &str) -> String {
    format!(
        "Hello There, your number is {} and you are calling {}",
        spell_out(to, "  "),
        spell_out(from, " ")
    )
}

fn spell_out(value: &str, separator: &str) -> String {
    let mut spelled = String::with_capacity(value.len() * (separator.len() + 1));
    for (i, ch) in value.chars().enumerate() {
        if i > 0 {
            spelled.push_str(separator);
        }
        spelled.push(ch);
    }
    spelled
}

/// Build the call-control document for an inbound call.
pub fn synthesize(to: &str, from: &str) -> Ncco {
    let instruction = CallInstruction::parse(to, from);
    let kind = instruction.kind();
    let ncco = instruction.into_ncco();

    record_ncco_synthesized(kind);
    debug!(
        target: "voice.ncco",
        instruction = kind,
        actions = ncco.actions().len(),
        ncco = ?ncco,
        "Synthesized call-control document"
    );

    ncco
}

use crate::types::{
    hash::{CalcHash, StructuralHasher},
    signal::{CanSignal, UiCanSignal},
};

/// Transmission behavior of a CAN message.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TxMethod {
    /// Sent every `cycle_time_ms`.
    #[default]
    Cyclic,
    /// Sent when a signal value changes, at most every `delay_time_ms`.
    OnChange,
    /// Sent on application request.
    OnEvent,
}

impl TxMethod {
    pub fn to_str(self) -> &'static str {
        match self {
            TxMethod::Cyclic => "cyclic",
            TxMethod::OnChange => "on-change",
            TxMethod::OnEvent => "on-event",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "cyclic" => Some(TxMethod::Cyclic),
            "on-change" => Some(TxMethod::OnChange),
            "on-event" => Some(TxMethod::OnEvent),
            _ => None,
        }
    }
}

/// Core part of a CAN message.
#[derive(Clone, Debug, PartialEq)]
pub struct CanMessage {
    /// Message name; also the sort key.
    pub name: String,
    pub comment: String,
    /// Numeric CAN ID.
    pub can_id: u32,
    /// `true` for 29 bit identifiers.
    pub is_extended: bool,
    /// Payload length in bytes.
    pub dlc: u16,
    pub tx_method: TxMethod,
    /// Only meaningful for [`TxMethod::Cyclic`].
    pub cycle_time_ms: u32,
    /// Minimum distance between two transmissions for [`TxMethod::OnChange`].
    pub delay_time_ms: u16,
    /// Receive timeout.
    pub timeout_ms: u32,
    pub signals: Vec<CanSignal>,
}

impl Default for CanMessage {
    fn default() -> Self {
        CanMessage {
            name: String::new(),
            comment: String::new(),
            can_id: 0,
            is_extended: false,
            dlc: 8,
            tx_method: TxMethod::Cyclic,
            cycle_time_ms: 100,
            delay_time_ms: 0,
            timeout_ms: 310,
            signals: Vec::new(),
        }
    }
}

impl CanMessage {
    /// Creates an empty cyclic message with default timing.
    pub fn new(name: &str, can_id: u32) -> Self {
        CanMessage {
            name: name.to_string(),
            can_id,
            ..Default::default()
        }
    }
}

impl CalcHash for CanMessage {
    fn calc_hash(&self, hasher: &mut StructuralHasher) {
        hasher.write_str(&self.name);
        hasher.write_str(&self.comment);
        hasher.write_u32(self.can_id);
        hasher.write_bool(self.is_extended);
        hasher.write_u16(self.dlc);
        hasher.write_str(self.tx_method.to_str());
        hasher.write_u32(self.cycle_time_ms);
        hasher.write_u16(self.delay_time_ms);
        hasher.write_u32(self.timeout_ms);
        hasher.write_all(&self.signals);
    }
}

/// UI part of a CAN message.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct UiCanMessage {
    pub signals: Vec<UiCanSignal>,
}

impl CalcHash for UiCanMessage {
    fn calc_hash(&self, hasher: &mut StructuralHasher) {
        hasher.write_all(&self.signals);
    }
}

/// Rewrites every signal's `element_index` to its sequential position: the signals of the
/// first message get `0..n`, the next message continues from `n`, and so on.
///
/// Returns the number of signals, i.e. the number of list elements the messages occupy.
pub fn assign_element_indices(messages: &mut [CanMessage]) -> usize {
    let mut counter: usize = 0;
    for message in messages.iter_mut() {
        for signal in message.signals.iter_mut() {
            signal.element_index = counter;
            counter += 1;
        }
    }
    counter
}

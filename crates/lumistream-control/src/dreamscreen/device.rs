//! Device identity on the capture network.

use crate::dreamscreen::protocol::{Packet, CMD_SUBSCRIBE};
use serde::{Deserialize, Serialize};

/// Which capture-network device this listener presents itself as.
///
/// Only the two light-mirroring device classes are modeled; the capture
/// sources themselves (the HD/4K units) are peers we listen to, never
/// identities we assume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeviceKind {
    /// Original sector-mirroring receiver
    #[default]
    SideKick,
    /// Newer receiver hardware, same wire behavior
    Connect,
}

impl DeviceKind {
    /// Product type byte reported during the subscription handshake.
    pub fn product_id(self) -> u8 {
        match self {
            DeviceKind::SideKick => 0x03,
            DeviceKind::Connect => 0x04,
        }
    }

    /// Reply to a subscription probe for `group`. Echoing the subscribe
    /// command keeps the capture source sending sector data to us.
    pub fn subscription_ack(self, group: u8) -> Packet {
        Packet {
            group,
            flags: 0x10,
            command_upper: CMD_SUBSCRIBE.0,
            command_lower: CMD_SUBSCRIBE.1,
            payload: vec![self.product_id()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_ack_echoes_command() {
        let ack = DeviceKind::SideKick.subscription_ack(1);
        assert_eq!(ack.command(), CMD_SUBSCRIBE);
        assert_eq!(ack.group, 1);
        assert_eq!(ack.payload, vec![0x03]);

        let wire = ack.encode();
        let decoded = Packet::decode(&wire).unwrap();
        assert_eq!(decoded, ack);
    }

    #[test]
    fn test_device_kind_serde_names() {
        assert_eq!(
            serde_json::to_string(&DeviceKind::Connect).unwrap(),
            "\"Connect\""
        );
        let kind: DeviceKind = serde_json::from_str("\"SideKick\"").unwrap();
        assert_eq!(kind, DeviceKind::SideKick);
    }
}

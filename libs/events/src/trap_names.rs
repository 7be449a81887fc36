//! Trap number to human-readable name lookup.

/// Placeholder emitted when a generic trap number has no known name.
pub const UNKNOWN_TRAP_NAME: &str = "UNKNOWN_TRAP";

/// Resolves generic trap numbers to names.
///
/// Injected into the encoder so callers can substitute their own table.
pub trait TrapNames {
    /// Returns the name for `trap_num`, or `None` if it is not known.
    fn lookup(&self, trap_num: u16) -> Option<&str>;
}

impl<T: TrapNames + ?Sized> TrapNames for &T {
    fn lookup(&self, trap_num: u16) -> Option<&str> {
        (**self).lookup(trap_num)
    }
}

/// The standard subnet management trap table.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTrapNames;

impl TrapNames for StandardTrapNames {
    fn lookup(&self, trap_num: u16) -> Option<&str> {
        let name = match trap_num {
            64 => "GID in service",
            65 => "GID out of service",
            66 => "New mcast group created",
            67 => "Mcast group deleted",
            68 => "UnPath, Path no longer valid",
            69 => "RePath, Path recomputed",
            128 => "Link state change",
            129 => "Local Link integrity threshold reached",
            130 => "Excessive Buffer Overrun Threshold reached",
            131 => "Flow Control Update watchdog timer expired",
            144 => {
                "CapabilityMask, NodeDescription, Link [Width|Speed] Enabled, SM priority changed"
            }
            145 => "System Image GUID changed",
            256 => "M_Key violation",
            257 => "P_Key violation",
            258 => "Q_Key violation",
            259 => "Switch P_Key violation",
            _ => return None,
        };
        Some(name)
    }
}

/// Resolves `trap_num` through `names`, falling back to [`UNKNOWN_TRAP_NAME`].
pub fn trap_name_or_placeholder<N: TrapNames + ?Sized>(names: &N, trap_num: u16) -> String {
    names
        .lookup(trap_num)
        .unwrap_or(UNKNOWN_TRAP_NAME)
        .to_string()
}

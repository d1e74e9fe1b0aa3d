//! Forwarded-socket touch backends (minitouch and maatouch)
//!
//! Both daemons speak a line-oriented protocol over an abstract socket
//! forwarded to a local TCP port:
//! - `minitouch`: down/up only; movement is approximated
//! - `maatouch`: same header and framing, plus a true move command

mod maatouch;
mod minitouch;
mod session;

pub use maatouch::MaaTouch;
pub use minitouch::MiniTouch;
pub use session::SessionInfo;

use crate::gesture::TouchEvent;

/// Encode one primitive event as protocol lines (each sent with its own
/// commit). Backends without a true move primitive pass
/// `move_capable = false` and re-issue `d` for movement.
pub(crate) fn encode_event(event: TouchEvent, pressure: u32, move_capable: bool) -> Vec<String> {
    let contact = match event {
        TouchEvent::Down(p) => format!("d 0 {} {} {}", p.x, p.y, pressure),
        TouchEvent::Move(p) if move_capable => format!("m 0 {} {} {}", p.x, p.y, pressure),
        TouchEvent::Move(p) => format!("d 0 {} {} {}", p.x, p.y, pressure),
        TouchEvent::Up => "u 0".to_string(),
    };
    vec![contact, "c".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::Point;

    #[test]
    fn down_and_up_framing() {
        assert_eq!(
            encode_event(TouchEvent::Down(Point::new(100, 200)), 50, false),
            vec!["d 0 100 200 50", "c"]
        );
        assert_eq!(encode_event(TouchEvent::Up, 50, false), vec!["u 0", "c"]);
    }

    #[test]
    fn move_uses_m_only_when_capable() {
        let point = TouchEvent::Move(Point::new(10, 20));
        assert_eq!(encode_event(point, 50, true), vec!["m 0 10 20 50", "c"]);
        assert_eq!(encode_event(point, 50, false), vec!["d 0 10 20 50", "c"]);
    }
}

//! Who may see and change what.

use opsboard_core::{BoardError, BoardResult};
use std::net::IpAddr;

use crate::board::Board;
use crate::user::{Role, User};

pub fn can_view_board(user: &User, board: &Board) -> bool {
    match user.role {
        Role::SuperAdmin | Role::Admin => true,
        Role::SubAdmin => {
            user.city_ids.contains(&board.city_id) || user.board_ids.contains(&board.id)
        }
        Role::Counsellor | Role::User => user.board_ids.contains(&board.id),
    }
}

pub fn ensure_board_access(user: &User, board: &Board) -> BoardResult<()> {
    if can_view_board(user, board) {
        Ok(())
    } else {
        Err(BoardError::forbidden(format!(
            "You do not have access to board '{}'",
            board.name
        )))
    }
}

pub fn ensure_can_manage_boards(user: &User) -> BoardResult<()> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(BoardError::forbidden("Only admins can create or delete boards"))
    }
}

/// Reject restricted users calling from an address outside their allow-list.
/// An unknown source address counts as unrecognized.
pub fn check_source_ip(user: &User, ip: Option<IpAddr>) -> BoardResult<()> {
    if !user.is_ip_restricted() {
        return Ok(());
    }
    match ip {
        Some(ip) if user.allows_ip(ip) => Ok(()),
        _ => Err(BoardError::Forbidden {
            message: "Access from this IP address is not allowed".to_string(),
            force_logout: true,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn board(city_id: Uuid) -> Board {
        Board::new(Uuid::new_v4(), city_id, "Leads".into(), None, None)
    }

    #[test]
    fn test_subadmin_sees_boards_of_their_cities() {
        let city = Uuid::new_v4();
        let mut sub = User::new("S".into(), "s@example.com".into(), Role::SubAdmin);
        sub.city_ids.push(city);

        assert!(can_view_board(&sub, &board(city)));
        assert!(!can_view_board(&sub, &board(Uuid::new_v4())));
    }

    #[test]
    fn test_counsellor_needs_explicit_assignment() {
        let city = Uuid::new_v4();
        let assigned = board(city);
        let mut counsellor = User::new("C".into(), "c@example.com".into(), Role::Counsellor);
        counsellor.city_ids.push(city);
        assert!(ensure_board_access(&counsellor, &assigned).is_err());

        counsellor.board_ids.push(assigned.id);
        assert!(ensure_board_access(&counsellor, &assigned).is_ok());
    }

    #[test]
    fn test_manage_boards_requires_admin() {
        let admin = User::new("A".into(), "a@example.com".into(), Role::Admin);
        let sub = User::new("S".into(), "s@example.com".into(), Role::SubAdmin);
        assert!(ensure_can_manage_boards(&admin).is_ok());
        assert!(matches!(
            ensure_can_manage_boards(&sub),
            Err(BoardError::Forbidden { force_logout: false, .. })
        ));
    }

    #[test]
    fn test_unrecognized_ip_forces_logout() {
        let mut admin = User::new("A".into(), "a@example.com".into(), Role::Admin);
        admin.allowed_ips = vec!["10.0.0.1".parse().unwrap()];

        assert!(check_source_ip(&admin, Some("10.0.0.1".parse().unwrap())).is_ok());
        assert!(matches!(
            check_source_ip(&admin, Some("10.0.0.2".parse().unwrap())),
            Err(BoardError::Forbidden { force_logout: true, .. })
        ));
        assert!(matches!(
            check_source_ip(&admin, None),
            Err(BoardError::Forbidden { force_logout: true, .. })
        ));
    }
}

use kernel::id::Id;

pub struct UserMarker;
pub type UserId = Id<UserMarker>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_roundtrip() {
        let user_id = UserId::new(42);
        assert_eq!(user_id.get(), 42);
        assert_eq!(i64::from(user_id), 42);
    }
}

use crate::catalog::error::CatalogError;
use crate::entities::user::Role;

/// Named permission checked before a mutating catalog operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    AuthorReview,
    ModerateReviews,
    SellProducts,
    ManageCategories,
}

impl Capability {
    fn granted_to(self, role: Role) -> bool {
        match self {
            Capability::AuthorReview => role == Role::Buyer,
            Capability::ModerateReviews | Capability::ManageCategories => role == Role::Admin,
            Capability::SellProducts => matches!(role, Role::Seller | Role::Admin),
        }
    }

    fn denial(self) -> &'static str {
        match self {
            Capability::AuthorReview => "Only buyers can leave reviews",
            Capability::ModerateReviews => "Only administrators can delete reviews",
            Capability::SellProducts => "Only sellers can manage products",
            Capability::ManageCategories => "Only administrators can manage categories",
        }
    }
}

/// Caller identity resolved by the auth layer. The catalog never sees the
/// credential itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i32,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: i32, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn require(&self, capability: Capability) -> Result<(), CatalogError> {
        if capability.granted_to(self.role) {
            Ok(())
        } else {
            Err(CatalogError::ForbiddenRole(capability.denial().to_string()))
        }
    }

    /// Sellers may only touch their own products; admins may touch any.
    pub fn require_owner(&self, seller_id: i32) -> Result<(), CatalogError> {
        if self.role == Role::Admin || self.user_id == seller_id {
            Ok(())
        } else {
            Err(CatalogError::ForbiddenOwnership(
                "You can only modify your own products".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::error::ErrorKind;

    #[test]
    fn only_buyers_author_reviews() {
        assert!(Principal::new(1, Role::Buyer).require(Capability::AuthorReview).is_ok());
        let err = Principal::new(2, Role::Seller)
            .require(Capability::AuthorReview)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ForbiddenRole);
        assert!(Principal::new(3, Role::Admin).require(Capability::AuthorReview).is_err());
    }

    #[test]
    fn ownership_is_checked_against_seller() {
        let seller = Principal::new(5, Role::Seller);
        assert!(seller.require_owner(5).is_ok());
        assert_eq!(
            seller.require_owner(6).unwrap_err().kind(),
            ErrorKind::ForbiddenOwnership
        );
        assert!(Principal::new(1, Role::Admin).require_owner(6).is_ok());
    }
}

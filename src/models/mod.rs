/// Fills `created_at` on insert and `updated_at` on every save. Services set
/// both from their clock; wall time is only the fallback for callers that
/// leave them untouched.
macro_rules! timestamped_behavior {
    () => {
        #[async_trait::async_trait]
        impl ActiveModelBehavior for ActiveModel {
            async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
            where
                C: ConnectionTrait,
            {
                let now = chrono::Utc::now();
                if insert && self.created_at.is_not_set() {
                    self.created_at = sea_orm::Set(now);
                }
                if !self.updated_at.is_set() {
                    self.updated_at = sea_orm::Set(now);
                }
                Ok(self)
            }
        }
    };
}

pub(crate) use timestamped_behavior;

pub mod business_hours;
pub mod dining_table;
pub mod menu_category;
pub mod menu_item;
pub mod order;
pub mod order_item;
pub mod restaurant;
pub mod staff_invitation;
pub mod user;
pub mod verification_token;

#[allow(unused_imports)]
pub mod prelude {
    pub use super::business_hours::{self, Entity as BusinessHours};
    pub use super::dining_table::{self, Entity as DiningTable};
    pub use super::menu_category::{self, Entity as MenuCategory};
    pub use super::menu_item::{self, Entity as MenuItem};
    pub use super::order::{self, Entity as Order};
    pub use super::order_item::{self, Entity as OrderItem};
    pub use super::restaurant::{self, Entity as Restaurant};
    pub use super::staff_invitation::{self, Entity as StaffInvitation};
    pub use super::user::{self, Entity as User};
    pub use super::verification_token::{self, Entity as VerificationToken};
}

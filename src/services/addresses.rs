//! Address book with last-write-wins default semantics.

use uuid::Uuid;

use crate::domain::{Address, Audit};
use crate::error::{Error, Result};
use crate::store::UnitOfWork;

/// Address fields as submitted by the client.
#[derive(Debug, Clone)]
pub struct AddressInput {
    pub title: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub district: Option<String>,
    pub postal_code: String,
    pub country: String,
    pub address_type: Option<String>,
    pub is_default: bool,
}

pub struct AddressService {
    uow: UnitOfWork,
}

impl AddressService {
    pub fn new(uow: UnitOfWork) -> Self {
        Self { uow }
    }

    pub async fn list(&mut self, user_id: Uuid) -> Result<Vec<Address>> {
        self.uow
            .addresses
            .find(|address| address.user_id == user_id)
            .await
            .map_err(Into::into)
    }

    pub async fn get(&mut self, user_id: Uuid, address_id: Uuid) -> Result<Address> {
        let address = self
            .uow
            .addresses
            .get(address_id)
            .await?
            .ok_or_else(|| Error::not_found("address", address_id))?;
        if address.user_id != user_id {
            return Err(Error::Forbidden);
        }
        Ok(address)
    }

    pub async fn create(&mut self, user_id: Uuid, input: AddressInput) -> Result<Address> {
        validate(&input)?;
        let address = Address {
            id: Uuid::now_v7(),
            user_id,
            title: input.title,
            line1: input.line1,
            line2: input.line2,
            city: input.city,
            district: input.district,
            postal_code: input.postal_code,
            country: input.country,
            address_type: input.address_type,
            is_default: input.is_default,
            audit: Audit::new(),
        };
        if address.is_default {
            self.clear_other_defaults(user_id, address.id).await?;
        }
        self.uow.addresses.add(address.clone());
        self.uow.save_changes().await?;
        Ok(address)
    }

    pub async fn update(
        &mut self,
        user_id: Uuid,
        address_id: Uuid,
        input: AddressInput,
    ) -> Result<Address> {
        validate(&input)?;
        let mut address = self.get(user_id, address_id).await?;
        address.title = input.title;
        address.line1 = input.line1;
        address.line2 = input.line2;
        address.city = input.city;
        address.district = input.district;
        address.postal_code = input.postal_code;
        address.country = input.country;
        address.address_type = input.address_type;
        address.is_default = input.is_default;
        if address.is_default {
            self.clear_other_defaults(user_id, address.id).await?;
        }
        self.uow.addresses.update(address.clone());
        self.uow.save_changes().await?;
        Ok(address)
    }

    /// Make one address the user's default, clearing the flag everywhere
    /// else. Last write wins.
    pub async fn set_default(&mut self, user_id: Uuid, address_id: Uuid) -> Result<Address> {
        let mut address = self.get(user_id, address_id).await?;
        self.clear_other_defaults(user_id, address_id).await?;
        address.is_default = true;
        self.uow.addresses.update(address.clone());
        self.uow.save_changes().await?;
        Ok(address)
    }

    pub async fn delete(&mut self, user_id: Uuid, address_id: Uuid) -> Result<()> {
        let address = self.get(user_id, address_id).await?;
        self.uow.addresses.soft_delete(address.id);
        self.uow.save_changes().await?;
        Ok(())
    }

    // Service-level loop, not a database trigger.
    async fn clear_other_defaults(&mut self, user_id: Uuid, keep: Uuid) -> Result<()> {
        let others = self
            .uow
            .addresses
            .find(|address| address.user_id == user_id && address.is_default && address.id != keep)
            .await?;
        for mut other in others {
            other.is_default = false;
            self.uow.addresses.update(other);
        }
        Ok(())
    }
}

fn validate(input: &AddressInput) -> Result<()> {
    if input.title.trim().is_empty()
        || input.line1.trim().is_empty()
        || input.city.trim().is_empty()
        || input.postal_code.trim().is_empty()
        || input.country.trim().is_empty()
    {
        return Err(Error::Validation(
            "title, line1, city, postal code and country are required".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::UnitOfWork;
    use crate::test_utils::setup_test_db;

    fn input(title: &str, is_default: bool) -> AddressInput {
        AddressInput {
            title: title.into(),
            line1: "1 Main St".into(),
            line2: None,
            city: "Springfield".into(),
            district: None,
            postal_code: "12345".into(),
            country: "US".into(),
            address_type: None,
            is_default,
        }
    }

    #[tokio::test]
    async fn setting_default_clears_previous_default() {
        let pool = setup_test_db().await;
        let user_id = Uuid::now_v7();
        let mut svc = AddressService::new(UnitOfWork::new(pool.clone()));

        let a = svc.create(user_id, input("Home", true)).await.unwrap();
        let b = svc.create(user_id, input("Work", false)).await.unwrap();

        svc.set_default(user_id, b.id).await.unwrap();

        let addresses = svc.list(user_id).await.unwrap();
        let defaults: Vec<_> = addresses.iter().filter(|x| x.is_default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id, b.id);
        assert!(!svc.get(user_id, a.id).await.unwrap().is_default);
    }

    #[tokio::test]
    async fn creating_a_default_address_undefaults_the_rest() {
        let pool = setup_test_db().await;
        let user_id = Uuid::now_v7();
        let mut svc = AddressService::new(UnitOfWork::new(pool.clone()));

        let a = svc.create(user_id, input("Home", true)).await.unwrap();
        let b = svc.create(user_id, input("Work", true)).await.unwrap();

        assert!(!svc.get(user_id, a.id).await.unwrap().is_default);
        assert!(svc.get(user_id, b.id).await.unwrap().is_default);
    }

    #[tokio::test]
    async fn defaults_do_not_leak_across_users() {
        let pool = setup_test_db().await;
        let alice = Uuid::now_v7();
        let bob = Uuid::now_v7();
        let mut svc = AddressService::new(UnitOfWork::new(pool.clone()));

        let a = svc.create(alice, input("Home", true)).await.unwrap();
        svc.create(bob, input("Home", true)).await.unwrap();

        assert!(svc.get(alice, a.id).await.unwrap().is_default);
    }

    #[tokio::test]
    async fn delete_is_soft_and_ownership_checked() {
        let pool = setup_test_db().await;
        let user_id = Uuid::now_v7();
        let mut svc = AddressService::new(UnitOfWork::new(pool.clone()));
        let a = svc.create(user_id, input("Home", false)).await.unwrap();

        assert!(matches!(
            svc.delete(Uuid::now_v7(), a.id).await.unwrap_err(),
            Error::Forbidden
        ));

        svc.delete(user_id, a.id).await.unwrap();
        assert!(matches!(
            svc.get(user_id, a.id).await.unwrap_err(),
            Error::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn blank_required_fields_are_rejected() {
        let pool = setup_test_db().await;
        let mut svc = AddressService::new(UnitOfWork::new(pool.clone()));
        let mut bad = input("Home", false);
        bad.city = "  ".into();
        assert!(matches!(
            svc.create(Uuid::now_v7(), bad).await.unwrap_err(),
            Error::Validation(_)
        ));
    }
}

//! Credit packages

use serde::Serialize;
use skillswap_core::validation::require_non_blank;
use skillswap_core::{CoreError, CreditPackage, NewCreditPackage};
use skillswap_repository::{LedgerRepository, PersonRepository};
use tracing::info;

use crate::auth::Identity;
use crate::context::ServiceContext;
use crate::error::{Result, ServiceError};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReceipt {
    pub package_id: i64,
    pub credits_added: i64,
    pub balance: i64,
}

#[derive(Clone)]
pub struct CreditService {
    ctx: ServiceContext,
}

impl CreditService {
    pub(crate) fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Packages currently on sale
    pub async fn list_packages(&self) -> Result<Vec<CreditPackage>> {
        Ok(self.ctx.store.list_credit_packages(true).await?)
    }

    pub async fn create_package(
        &self,
        identity: &Identity,
        package: NewCreditPackage,
    ) -> Result<CreditPackage> {
        identity.require_admin()?;
        require_non_blank("name", &package.name)?;
        if package.credits <= 0 {
            return Err(CoreError::validation("credits", "must be positive").into());
        }
        if package.price_cents < 0 {
            return Err(CoreError::validation("priceCents", "must not be negative").into());
        }

        let package = self.ctx.store.insert_credit_package(package).await?;
        info!("Credit package {} created: {}", package.id, package.name);
        Ok(package)
    }

    /// Add a package's credits to the caller's balance.
    ///
    /// Payment capture is outside this service; no ledger entry is written
    /// because transactions belong to a session exchange.
    pub async fn purchase(&self, package_id: i64, identity: &Identity) -> Result<PurchaseReceipt> {
        let person = self.ctx.acting_person(identity).await?;
        let package = self
            .ctx
            .store
            .find_credit_package(package_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("credit package", package_id))?;
        if !package.active {
            return Err(ServiceError::invalid_state(format!(
                "credit package {} is not available",
                package_id
            )));
        }

        let balance = self.ctx.store.adjust_credits(person.id, package.credits).await?;
        info!(
            "Person {} purchased package {} (+{} credits)",
            person.id, package.id, package.credits
        );
        Ok(PurchaseReceipt {
            package_id: package.id,
            credits_added: package.credits,
            balance,
        })
    }
}

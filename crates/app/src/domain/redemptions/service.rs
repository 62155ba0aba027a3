//! Redemption service.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use async_trait::async_trait;
use mockall::automock;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::{
    clock::Clock,
    domain::{
        codes::{
            CodesService, CodesServiceError,
            data::{CodeClaim, CodeRelease},
            records::CodeRecord,
        },
        ledger::{LedgerService, records::NewTransaction},
        redemptions::{
            data::{
                BonusOutcome, Redemption, RedemptionRequest, RedemptionSettings, ReferralResult,
                ValidRedemption,
            },
            errors::RedemptionError,
        },
        referrals::{ReferralsService, records::ReferralAttribution},
    },
    notifications::{CodeDelivery, DeliveryKind, Notifier, NotifierError},
};

/// Runs purchases through claim, delivery, ledger and referral crediting.
#[derive(Clone)]
pub struct RedemptionWorkflow {
    codes: Arc<dyn CodesService>,
    ledger: Arc<dyn LedgerService>,
    referrals: Arc<dyn ReferralsService>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    settings: RedemptionSettings,
}

impl RedemptionWorkflow {
    #[must_use]
    pub fn new(
        codes: Arc<dyn CodesService>,
        ledger: Arc<dyn LedgerService>,
        referrals: Arc<dyn ReferralsService>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        settings: RedemptionSettings,
    ) -> Self {
        Self {
            codes,
            ledger,
            referrals,
            notifier,
            clock,
            settings,
        }
    }

    async fn deliver(&self, delivery: CodeDelivery) -> Result<(), NotifierError> {
        let limit = self.settings.notify_timeout;

        match timeout(limit, self.notifier.deliver(delivery)).await {
            Ok(result) => result,
            Err(_elapsed) => Err(NotifierError::Timeout(limit)),
        }
    }

    /// Compensation for a failed delivery. Failures are logged; the codes stay claimed.
    async fn release(&self, customer: &str, claimed: &[CodeRecord]) {
        let expected = claimed.len() as u64;

        let result = self
            .codes
            .release_codes(CodeRelease {
                customer: customer.to_string(),
                codes: claimed.iter().map(|code| code.uuid).collect(),
            })
            .await;

        match result {
            Ok(released) if released == expected => {
                info!(customer, released, "claimed codes returned to inventory");
            }
            Ok(released) => {
                error!(customer, released, expected, "only some claimed codes were released");
            }
            Err(error) => {
                error!(
                    customer,
                    error = %error,
                    codes = expected,
                    "failed to release claimed codes"
                );
            }
        }
    }

    async fn record(&self, request: &ValidRedemption) -> bool {
        let entry = NewTransaction {
            email: request.email.clone(),
            quantity: request.quantity,
            reference: request.reference.clone(),
            recorded_at: self.clock.now(),
        };

        match self.ledger.record_transaction(entry).await {
            Ok(record) => {
                info!(transaction = %record.uuid, "transaction recorded");

                true
            }
            Err(error) => {
                error!(
                    email = %request.email,
                    reference = %request.reference,
                    error = %error,
                    "codes delivered but ledger append failed"
                );

                false
            }
        }
    }

    async fn credit_referral(&self, referral_code: &str, referee: &str) -> ReferralResult {
        let attribution = match self.referrals.record_referral(referral_code, referee).await {
            Ok(attribution) => attribution,
            Err(error) => {
                warn!(referral_code, referee, error = %error, "referral attribution failed");

                return ReferralResult::Failed;
            }
        };

        match attribution {
            ReferralAttribution::Credited {
                referrer,
                referred_count,
            } => {
                info!(referrer = %referrer, referee, referred_count, "referral credited");

                let bonus = if self.bonus_due(referred_count) {
                    self.grant_bonus(&referrer).await
                } else {
                    BonusOutcome::NotDue
                };

                ReferralResult::Credited {
                    referrer,
                    referred_count,
                    bonus,
                }
            }
            ReferralAttribution::AlreadyReferred { referrer, .. } => {
                ReferralResult::AlreadyReferred { referrer }
            }
            ReferralAttribution::SelfReferral => ReferralResult::SelfReferral,
            ReferralAttribution::UnknownCode => {
                warn!(referral_code, referee, "unknown referral code");

                ReferralResult::UnknownCode
            }
        }
    }

    fn bonus_due(&self, referred_count: u64) -> bool {
        let threshold = self.settings.reward_threshold;

        threshold > 0 && referred_count > 0 && referred_count % threshold == 0
    }

    /// Claim, deliver and count one bonus code. The reward only counts once delivered.
    async fn grant_bonus(&self, referrer: &str) -> BonusOutcome {
        let claim = CodeClaim {
            customer: referrer.to_string(),
            quantity: 1,
            claimed_at: self.clock.now(),
        };

        let claimed = match self.codes.claim_codes(claim).await {
            Ok(claimed) => claimed,
            Err(CodesServiceError::InsufficientInventory { .. }) => {
                warn!(referrer, "no code left for referral bonus");

                return BonusOutcome::Shortage;
            }
            Err(error) => {
                warn!(referrer, error = %error, "failed to claim referral bonus");

                return BonusOutcome::Failed;
            }
        };

        let delivery = CodeDelivery {
            recipient: referrer.to_string(),
            kind: DeliveryKind::ReferralBonus,
            codes: claimed.iter().map(|code| code.code.clone()).collect(),
        };

        if let Err(error) = self.deliver(delivery).await {
            warn!(referrer, error = %error, "referral bonus delivery failed");

            self.release(referrer, &claimed).await;

            return BonusOutcome::DeliveryFailed;
        }

        match self.referrals.increment_rewards(referrer).await {
            Ok(account) => {
                info!(referrer, rewards_earned = account.rewards_earned, "referral bonus granted");

                BonusOutcome::Granted {
                    rewards_recorded: true,
                }
            }
            Err(error) => {
                error!(referrer, error = %error, "bonus delivered but reward count not updated");

                BonusOutcome::Granted {
                    rewards_recorded: false,
                }
            }
        }
    }
}

impl Debug for RedemptionWorkflow {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("RedemptionWorkflow")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RedemptionsService for RedemptionWorkflow {
    async fn redeem(&self, request: RedemptionRequest) -> Result<Redemption, RedemptionError> {
        let request = request.validate()?;

        let account = self
            .referrals
            .find_or_create_account(&request.email)
            .await
            .map_err(RedemptionError::Accounts)?;

        let claim = CodeClaim {
            customer: request.email.clone(),
            quantity: request.quantity,
            claimed_at: self.clock.now(),
        };

        let claimed = self.codes.claim_codes(claim).await.map_err(|error| match error {
            CodesServiceError::InsufficientInventory {
                requested,
                available,
            } => RedemptionError::InsufficientInventory {
                requested,
                available,
            },
            other => RedemptionError::Inventory(other),
        })?;

        info!(
            email = %request.email,
            reference = %request.reference,
            quantity = request.quantity,
            "codes claimed"
        );

        let delivery = CodeDelivery {
            recipient: request.email.clone(),
            kind: DeliveryKind::Purchase {
                quantity: request.quantity,
            },
            codes: claimed.iter().map(|code| code.code.clone()).collect(),
        };

        if let Err(error) = self.deliver(delivery).await {
            error!(
                email = %request.email,
                reference = %request.reference,
                error = %error,
                "code delivery failed, releasing claim"
            );

            self.release(&request.email, &claimed).await;

            return Err(RedemptionError::DeliveryFailed(error));
        }

        let ledger_recorded = self.record(&request).await;

        let referral = match request.referral_code.as_deref() {
            None => ReferralResult::NotRequested,
            Some(code) if code == account.referral_code => ReferralResult::SelfReferral,
            Some(code) => self.credit_referral(code, &request.email).await,
        };

        info!(
            email = %request.email,
            reference = %request.reference,
            delivered = claimed.len(),
            referral = referral.as_str(),
            "redemption complete"
        );

        Ok(Redemption {
            email: request.email,
            codes: claimed,
            referral_code: account.referral_code,
            ledger_recorded,
            referral,
        })
    }
}

#[automock]
#[async_trait]
pub trait RedemptionsService: Send + Sync {
    /// Run one purchase to a terminal state.
    ///
    /// A failed or timed-out delivery releases every claimed code before returning.
    async fn redeem(&self, request: RedemptionRequest) -> Result<Redemption, RedemptionError>;
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use jiff::Timestamp;
    use mockall::predicate::eq;
    use testresult::TestResult;

    use crate::{
        clock::MockClock,
        domain::{
            codes::{MockCodesService, records::CodeUuid},
            ledger::{
                LedgerServiceError, MockLedgerService,
                records::{TransactionRecord, TransactionUuid},
            },
            redemptions::data::RedemptionOutcome,
            referrals::{
                MockReferralsService, ReferralsServiceError,
                records::{ReferralAccountRecord, ReferralAccountUuid},
            },
        },
        notifications::MockNotifier,
    };

    use super::*;

    const NOW: i64 = 1_767_225_600;

    fn now() -> Timestamp {
        Timestamp::from_second(NOW).unwrap_or(Timestamp::UNIX_EPOCH)
    }

    fn account(email: &str, referral_code: &str) -> ReferralAccountRecord {
        ReferralAccountRecord {
            uuid: ReferralAccountUuid::new(),
            email: email.to_string(),
            referral_code: referral_code.to_string(),
            referred_emails: Vec::new(),
            rewards_earned: 0,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn claimed(customer: &str, codes: &[&str]) -> Vec<CodeRecord> {
        codes
            .iter()
            .map(|code| CodeRecord {
                uuid: CodeUuid::new(),
                code: (*code).to_string(),
                used: true,
                used_by: Some(customer.to_string()),
                used_at: Some(now()),
                created_at: now(),
            })
            .collect()
    }

    fn request(email: &str, quantity: i64, referral_code: Option<&str>) -> RedemptionRequest {
        RedemptionRequest {
            email: email.to_string(),
            quantity,
            reference: "pay_123".to_string(),
            referral_code: referral_code.map(ToString::to_string),
        }
    }

    fn ledger_entry(entry: &NewTransaction) -> TransactionRecord {
        TransactionRecord {
            uuid: TransactionUuid::new(),
            email: entry.email.clone(),
            quantity: entry.quantity,
            reference: entry.reference.clone(),
            created_at: entry.recorded_at,
        }
    }

    struct Mocks {
        codes: MockCodesService,
        ledger: MockLedgerService,
        referrals: MockReferralsService,
        notifier: MockNotifier,
        settings: RedemptionSettings,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                codes: MockCodesService::new(),
                ledger: MockLedgerService::new(),
                referrals: MockReferralsService::new(),
                notifier: MockNotifier::new(),
                settings: RedemptionSettings::default(),
            }
        }

        /// Requester `email` has an account with referral code `own_code`.
        fn with_account(mut self, email: &'static str, own_code: &'static str) -> Self {
            self.referrals
                .expect_find_or_create_account()
                .withf(move |candidate| candidate == email)
                .times(1)
                .returning(move |email| Ok(account(email, own_code)));

            self
        }

        /// A purchase of `codes` is claimed, delivered and recorded.
        fn with_purchase(mut self, email: &'static str, codes: &'static [&'static str]) -> Self {
            let quantity = u32::try_from(codes.len()).unwrap_or(u32::MAX);

            self.codes
                .expect_claim_codes()
                .withf(move |claim| claim.customer == email && claim.quantity == quantity)
                .times(1)
                .returning(move |claim| Ok(claimed(&claim.customer, codes)));

            self.notifier
                .expect_deliver()
                .withf(move |delivery| {
                    delivery.recipient == email
                        && delivery.kind == DeliveryKind::Purchase { quantity }
                })
                .times(1)
                .returning(|_| Ok(()));

            self.ledger
                .expect_record_transaction()
                .withf(move |entry| entry.email == email && entry.quantity == quantity)
                .times(1)
                .returning(|entry| Ok(ledger_entry(&entry)));

            self
        }

        fn workflow(self) -> RedemptionWorkflow {
            let mut clock = MockClock::new();

            clock.expect_now().return_const(now());

            RedemptionWorkflow::new(
                Arc::new(self.codes),
                Arc::new(self.ledger),
                Arc::new(self.referrals),
                Arc::new(self.notifier),
                Arc::new(clock),
                self.settings,
            )
        }
    }

    #[tokio::test]
    async fn complete_redemption_returns_own_referral_code() -> TestResult {
        let workflow = Mocks::new()
            .with_account("u1@example.com", "OWN001")
            .with_purchase("u1@example.com", &["A", "B"])
            .workflow();

        let redemption = workflow.redeem(request("U1@example.com", 2, None)).await?;

        assert_eq!(redemption.outcome(), RedemptionOutcome::Complete);
        assert_eq!(redemption.delivered(), 2);
        assert_eq!(redemption.referral_code, "OWN001");
        assert!(redemption.ledger_recorded, "ledger entry should be written");
        assert_eq!(redemption.referral, ReferralResult::NotRequested);

        Ok(())
    }

    #[tokio::test]
    async fn delivery_lists_every_claimed_code() -> TestResult {
        let mut mocks = Mocks::new().with_account("u1@example.com", "OWN001");

        mocks
            .codes
            .expect_claim_codes()
            .returning(|claim| Ok(claimed(&claim.customer, &["A", "B", "C"])));

        mocks
            .notifier
            .expect_deliver()
            .withf(|delivery| delivery.codes == vec!["A", "B", "C"])
            .times(1)
            .returning(|_| Ok(()));

        mocks
            .ledger
            .expect_record_transaction()
            .returning(|entry| Ok(ledger_entry(&entry)));

        mocks.workflow().redeem(request("u1@example.com", 3, None)).await?;

        Ok(())
    }

    #[tokio::test]
    async fn invalid_request_has_no_side_effects() {
        let workflow = Mocks::new().workflow();

        let result = workflow.redeem(request("u1@example.com", 0, None)).await;

        assert!(
            matches!(result, Err(ref error) if error.outcome() == RedemptionOutcome::InvalidRequest),
            "expected InvalidRequest, got {result:?}"
        );
    }

    #[tokio::test]
    async fn insufficient_inventory_stops_before_delivery() {
        let mut mocks = Mocks::new().with_account("u1@example.com", "OWN001");

        mocks.codes.expect_claim_codes().times(1).returning(|_| {
            Err(CodesServiceError::InsufficientInventory {
                requested: 2,
                available: 1,
            })
        });

        let result = mocks.workflow().redeem(request("u1@example.com", 2, None)).await;

        assert!(
            matches!(
                result,
                Err(RedemptionError::InsufficientInventory {
                    requested: 2,
                    available: 1
                })
            ),
            "expected InsufficientInventory, got {result:?}"
        );
    }

    #[tokio::test]
    async fn account_failure_is_a_persistence_failure() {
        let mut mocks = Mocks::new();

        mocks
            .referrals
            .expect_find_or_create_account()
            .returning(|_| Err(ReferralsServiceError::InvalidData));

        let result = mocks.workflow().redeem(request("u1@example.com", 1, None)).await;

        assert!(
            matches!(result, Err(ref error) if error.outcome() == RedemptionOutcome::FailedPersistence),
            "expected FailedPersistence, got {result:?}"
        );
    }

    #[tokio::test]
    async fn claim_storage_failure_is_a_persistence_failure() {
        let mut mocks = Mocks::new().with_account("u1@example.com", "OWN001");

        mocks
            .codes
            .expect_claim_codes()
            .returning(|_| Err(CodesServiceError::InvalidData));

        let result = mocks.workflow().redeem(request("u1@example.com", 1, None)).await;

        assert!(
            matches!(result, Err(RedemptionError::Inventory(CodesServiceError::InvalidData))),
            "expected Inventory error, got {result:?}"
        );
    }

    #[tokio::test]
    async fn failed_delivery_releases_exactly_the_claimed_codes() {
        let mut mocks = Mocks::new().with_account("u1@example.com", "OWN001");
        let batch = claimed("u1@example.com", &["A", "B"]);
        let uuids: Vec<CodeUuid> = batch.iter().map(|code| code.uuid).collect();

        mocks
            .codes
            .expect_claim_codes()
            .times(1)
            .return_once(move |_| Ok(batch));

        mocks
            .notifier
            .expect_deliver()
            .times(1)
            .returning(|_| Err(NotifierError::Timeout(Duration::from_secs(1))));

        mocks
            .codes
            .expect_release_codes()
            .with(eq(CodeRelease {
                customer: "u1@example.com".to_string(),
                codes: uuids,
            }))
            .times(1)
            .returning(|release| Ok(release.codes.len() as u64));

        let result = mocks.workflow().redeem(request("u1@example.com", 2, None)).await;

        assert!(
            matches!(result, Err(RedemptionError::DeliveryFailed(_))),
            "expected DeliveryFailed, got {result:?}"
        );
    }

    #[tokio::test]
    async fn failed_release_still_reports_delivery_failure() {
        let mut mocks = Mocks::new().with_account("u1@example.com", "OWN001");

        mocks
            .codes
            .expect_claim_codes()
            .returning(|claim| Ok(claimed(&claim.customer, &["A"])));

        mocks
            .notifier
            .expect_deliver()
            .returning(|_| Err(NotifierError::Timeout(Duration::from_secs(1))));

        mocks
            .codes
            .expect_release_codes()
            .times(1)
            .returning(|_| Err(CodesServiceError::InvalidData));

        let result = mocks.workflow().redeem(request("u1@example.com", 1, None)).await;

        assert!(
            matches!(result, Err(ref error) if error.outcome() == RedemptionOutcome::FailedDelivery),
            "expected FailedDelivery, got {result:?}"
        );
    }

    struct HangingNotifier;

    #[async_trait]
    impl Notifier for HangingNotifier {
        async fn deliver(&self, _delivery: CodeDelivery) -> Result<(), NotifierError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;

            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_delivery_times_out_and_releases() {
        let mut mocks = Mocks::new().with_account("u1@example.com", "OWN001");

        mocks.settings.notify_timeout = Duration::from_secs(5);

        mocks
            .codes
            .expect_claim_codes()
            .returning(|claim| Ok(claimed(&claim.customer, &["A"])));

        mocks
            .codes
            .expect_release_codes()
            .times(1)
            .returning(|release| Ok(release.codes.len() as u64));

        let mut clock = MockClock::new();

        clock.expect_now().return_const(now());

        let workflow = RedemptionWorkflow::new(
            Arc::new(mocks.codes),
            Arc::new(mocks.ledger),
            Arc::new(mocks.referrals),
            Arc::new(HangingNotifier),
            Arc::new(clock),
            mocks.settings,
        );

        let result = workflow.redeem(request("u1@example.com", 1, None)).await;

        assert!(
            matches!(
                result,
                Err(RedemptionError::DeliveryFailed(NotifierError::Timeout(limit)))
                    if limit == Duration::from_secs(5)
            ),
            "expected timeout, got {result:?}"
        );
    }

    #[tokio::test]
    async fn ledger_failure_after_delivery_still_completes() -> TestResult {
        let mut mocks = Mocks::new().with_account("u1@example.com", "OWN001");

        mocks
            .codes
            .expect_claim_codes()
            .returning(|claim| Ok(claimed(&claim.customer, &["A"])));

        mocks.notifier.expect_deliver().returning(|_| Ok(()));

        mocks
            .ledger
            .expect_record_transaction()
            .times(1)
            .returning(|_| Err(LedgerServiceError::InvalidData));

        let redemption = mocks.workflow().redeem(request("u1@example.com", 1, None)).await?;

        assert_eq!(redemption.outcome(), RedemptionOutcome::Complete);
        assert!(!redemption.ledger_recorded, "ledger failure should be reported");

        Ok(())
    }

    #[tokio::test]
    async fn own_referral_code_is_not_attributed() -> TestResult {
        let workflow = Mocks::new()
            .with_account("u1@example.com", "OWN001")
            .with_purchase("u1@example.com", &["A"])
            .workflow();

        let redemption = workflow
            .redeem(request("u1@example.com", 1, Some("own001")))
            .await?;

        assert_eq!(redemption.referral, ReferralResult::SelfReferral);

        Ok(())
    }

    #[tokio::test]
    async fn referral_below_threshold_grants_no_bonus() -> TestResult {
        let mut mocks = Mocks::new()
            .with_account("friend@example.com", "FRND01")
            .with_purchase("friend@example.com", &["A"]);

        mocks
            .referrals
            .expect_record_referral()
            .withf(|code, referee| code == "REF001" && referee == "friend@example.com")
            .times(1)
            .returning(|_, _| {
                Ok(ReferralAttribution::Credited {
                    referrer: "ref@example.com".to_string(),
                    referred_count: 3,
                })
            });

        let redemption = mocks
            .workflow()
            .redeem(request("friend@example.com", 1, Some("REF001")))
            .await?;

        assert_eq!(
            redemption.referral,
            ReferralResult::Credited {
                referrer: "ref@example.com".to_string(),
                referred_count: 3,
                bonus: BonusOutcome::NotDue,
            }
        );

        Ok(())
    }

    fn credited_at(mut mocks: Mocks, referred_count: u64) -> Mocks {
        mocks.referrals.expect_record_referral().returning(move |_, _| {
            Ok(ReferralAttribution::Credited {
                referrer: "ref@example.com".to_string(),
                referred_count,
            })
        });

        mocks
    }

    fn expect_bonus(mocks: &mut Mocks) {
        mocks
            .codes
            .expect_claim_codes()
            .withf(|claim| claim.customer == "ref@example.com" && claim.quantity == 1)
            .times(1)
            .returning(|claim| Ok(claimed(&claim.customer, &["BONUS1"])));

        mocks
            .notifier
            .expect_deliver()
            .withf(|delivery| {
                delivery.recipient == "ref@example.com"
                    && delivery.kind == DeliveryKind::ReferralBonus
                    && delivery.codes == vec!["BONUS1"]
            })
            .times(1)
            .returning(|_| Ok(()));

        mocks
            .referrals
            .expect_increment_rewards()
            .withf(|email| email == "ref@example.com")
            .times(1)
            .returning(|email| {
                let mut account = account(email, "REF001");

                account.rewards_earned = 1;

                Ok(account)
            });
    }

    #[tokio::test]
    async fn reward_is_granted_on_every_threshold_multiple() -> TestResult {
        for referred_count in 1..=10 {
            let mut mocks = credited_at(
                Mocks::new()
                    .with_account("friend@example.com", "FRND01")
                    .with_purchase("friend@example.com", &["A"]),
                referred_count,
            );

            let due = referred_count % 5 == 0;

            if due {
                expect_bonus(&mut mocks);
            }

            let redemption = mocks
                .workflow()
                .redeem(request("friend@example.com", 1, Some("REF001")))
                .await?;

            let expected = if due {
                BonusOutcome::Granted {
                    rewards_recorded: true,
                }
            } else {
                BonusOutcome::NotDue
            };

            assert!(
                matches!(redemption.referral, ReferralResult::Credited { bonus, .. } if bonus == expected),
                "count {referred_count}: unexpected referral result {:?}",
                redemption.referral
            );
        }

        Ok(())
    }

    #[tokio::test]
    async fn bonus_shortage_is_swallowed() -> TestResult {
        let mut mocks = credited_at(
            Mocks::new()
                .with_account("friend@example.com", "FRND01")
                .with_purchase("friend@example.com", &["A"]),
            5,
        );

        mocks
            .codes
            .expect_claim_codes()
            .withf(|claim| claim.customer == "ref@example.com")
            .times(1)
            .returning(|_| {
                Err(CodesServiceError::InsufficientInventory {
                    requested: 1,
                    available: 0,
                })
            });

        let redemption = mocks
            .workflow()
            .redeem(request("friend@example.com", 1, Some("REF001")))
            .await?;

        assert!(
            matches!(
                redemption.referral,
                ReferralResult::Credited {
                    bonus: BonusOutcome::Shortage,
                    ..
                }
            ),
            "unexpected referral result {:?}",
            redemption.referral
        );

        Ok(())
    }

    #[tokio::test]
    async fn failed_bonus_delivery_releases_code_without_reward() -> TestResult {
        let mut mocks = credited_at(
            Mocks::new()
                .with_account("friend@example.com", "FRND01")
                .with_purchase("friend@example.com", &["A"]),
            5,
        );

        mocks
            .codes
            .expect_claim_codes()
            .withf(|claim| claim.customer == "ref@example.com")
            .times(1)
            .returning(|claim| Ok(claimed(&claim.customer, &["BONUS1"])));

        mocks
            .notifier
            .expect_deliver()
            .withf(|delivery| delivery.kind == DeliveryKind::ReferralBonus)
            .times(1)
            .returning(|_| Err(NotifierError::Timeout(Duration::from_secs(1))));

        mocks
            .codes
            .expect_release_codes()
            .withf(|release| release.customer == "ref@example.com" && release.codes.len() == 1)
            .times(1)
            .returning(|_| Ok(1));

        mocks.referrals.expect_increment_rewards().never();

        let redemption = mocks
            .workflow()
            .redeem(request("friend@example.com", 1, Some("REF001")))
            .await?;

        assert!(
            matches!(
                redemption.referral,
                ReferralResult::Credited {
                    bonus: BonusOutcome::DeliveryFailed,
                    ..
                }
            ),
            "unexpected referral result {:?}",
            redemption.referral
        );

        Ok(())
    }

    #[tokio::test]
    async fn referral_errors_do_not_fail_the_redemption() -> TestResult {
        let mut mocks = Mocks::new()
            .with_account("friend@example.com", "FRND01")
            .with_purchase("friend@example.com", &["A"]);

        mocks
            .referrals
            .expect_record_referral()
            .returning(|_, _| Err(ReferralsServiceError::InvalidData));

        let redemption = mocks
            .workflow()
            .redeem(request("friend@example.com", 1, Some("REF001")))
            .await?;

        assert_eq!(redemption.outcome(), RedemptionOutcome::Complete);
        assert_eq!(redemption.referral, ReferralResult::Failed);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_and_repeated_referrals_are_reported() -> TestResult {
        let mut unknown = Mocks::new()
            .with_account("friend@example.com", "FRND01")
            .with_purchase("friend@example.com", &["A"]);

        unknown
            .referrals
            .expect_record_referral()
            .returning(|_, _| Ok(ReferralAttribution::UnknownCode));

        let redemption = unknown
            .workflow()
            .redeem(request("friend@example.com", 1, Some("NOPE00")))
            .await?;

        assert_eq!(redemption.referral, ReferralResult::UnknownCode);

        let mut repeated = Mocks::new()
            .with_account("friend@example.com", "FRND01")
            .with_purchase("friend@example.com", &["A"]);

        repeated.referrals.expect_record_referral().returning(|_, _| {
            Ok(ReferralAttribution::AlreadyReferred {
                referrer: "ref@example.com".to_string(),
                referred_count: 5,
            })
        });

        let redemption = repeated
            .workflow()
            .redeem(request("friend@example.com", 1, Some("REF001")))
            .await?;

        assert_eq!(
            redemption.referral,
            ReferralResult::AlreadyReferred {
                referrer: "ref@example.com".to_string()
            },
            "a repeated referral must not trigger a bonus"
        );

        Ok(())
    }
}

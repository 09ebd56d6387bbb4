use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::event_sourcing::core::Aggregate;
use super::commands::AccountCommand;
use super::errors::AccountError;
use super::events::*;
use super::value_objects::Address;

// ============================================================================
// Account Aggregate - Points Balance and Shipping Address
// ============================================================================
//
// The balance is a u64 and every debit goes through `checked_sub`, so it can
// never be negative.
//
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AccountAggregate {
    pub account_id: Uuid,
    pub version: i64,
    pub display_name: String,
    pub points_balance: u64,
    pub shipping_address: Option<Address>,
    pub opened_at: DateTime<Utc>,
}

impl AccountAggregate {
    fn validate_address(address: &Address) -> Result<(), AccountError> {
        match address.missing_field() {
            Some(field) => Err(AccountError::IncompleteAddress(field)),
            None => Ok(()),
        }
    }

    pub fn has_shipping_address(&self) -> bool {
        self.shipping_address.is_some()
    }
}

impl Aggregate for AccountAggregate {
    const AGGREGATE_TYPE: &'static str = "Account";

    type Event = AccountEvent;
    type Command = AccountCommand;
    type Error = AccountError;

    fn apply_first_event(aggregate_id: Uuid, event: &Self::Event) -> Result<Self, Self::Error> {
        match event {
            AccountEvent::Opened(e) => Ok(Self {
                account_id: aggregate_id,
                version: 1,
                display_name: e.display_name.clone(),
                points_balance: e.starting_points,
                shipping_address: None,
                opened_at: e.opened_at,
            }),
            _ => Err(AccountError::NotInitialized),
        }
    }

    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error> {
        match event {
            AccountEvent::Opened(_) => return Err(AccountError::AlreadyOpened),
            AccountEvent::AddressChanged(e) => {
                self.shipping_address = Some(e.address.clone());
            }
            AccountEvent::PointsDebited(e) => {
                self.points_balance = self.points_balance.checked_sub(e.amount).ok_or(
                    AccountError::InsufficientPoints {
                        required: e.amount,
                        available: self.points_balance,
                    },
                )?;
            }
            AccountEvent::PointsCredited(e) => {
                self.points_balance = self
                    .points_balance
                    .checked_add(e.amount)
                    .ok_or(AccountError::BalanceOverflow)?;
            }
        }

        self.version += 1;
        Ok(())
    }

    fn handle_initial_command(command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            AccountCommand::OpenAccount { display_name, starting_points } => {
                if display_name.trim().is_empty() {
                    return Err(AccountError::EmptyDisplayName);
                }

                Ok(vec![AccountEvent::Opened(AccountOpened {
                    display_name: display_name.trim().to_string(),
                    starting_points: *starting_points,
                    opened_at: Utc::now(),
                })])
            }
            _ => Err(AccountError::NotInitialized),
        }
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            AccountCommand::OpenAccount { .. } => Err(AccountError::AlreadyOpened),

            AccountCommand::SetShippingAddress { address } => {
                Self::validate_address(address)?;

                if self.shipping_address.as_ref() == Some(address) {
                    return Ok(vec![]); // No change
                }

                Ok(vec![AccountEvent::AddressChanged(AccountAddressChanged {
                    address: address.clone(),
                })])
            }

            AccountCommand::DebitPoints { amount, order_ids } => {
                if *amount == 0 {
                    return Err(AccountError::ZeroAmount);
                }
                if *amount > self.points_balance {
                    return Err(AccountError::InsufficientPoints {
                        required: *amount,
                        available: self.points_balance,
                    });
                }

                Ok(vec![AccountEvent::PointsDebited(PointsDebited {
                    amount: *amount,
                    order_ids: order_ids.clone(),
                })])
            }

            AccountCommand::CreditPoints { amount, reason } => {
                if *amount == 0 {
                    return Err(AccountError::ZeroAmount);
                }
                if self.points_balance.checked_add(*amount).is_none() {
                    return Err(AccountError::BalanceOverflow);
                }

                Ok(vec![AccountEvent::PointsCredited(PointsCredited {
                    amount: *amount,
                    reason: reason.clone(),
                })])
            }
        }
    }

    fn aggregate_id(&self) -> Uuid {
        self.account_id
    }

    fn version(&self) -> i64 {
        self.version
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::value_objects::AccountCreditReason;

    fn open(points: u64) -> AccountAggregate {
        let events = AccountAggregate::handle_initial_command(&AccountCommand::OpenAccount {
            display_name: "Jordan".to_string(),
            starting_points: points,
        })
        .unwrap();
        AccountAggregate::replay(Uuid::new_v4(), &events).unwrap().unwrap()
    }

    fn address() -> Address {
        Address {
            street: "1 Court St".to_string(),
            city: "Springfield".to_string(),
            state: "MA".to_string(),
            postal_code: "01101".to_string(),
            country: "US".to_string(),
        }
    }

    fn execute(account: &mut AccountAggregate, command: AccountCommand) -> Result<(), AccountError> {
        for event in account.handle_command(&command)? {
            account.apply_event(&event)?;
        }
        Ok(())
    }

    #[test]
    fn test_open_account() {
        let account = open(100);
        assert_eq!(account.points_balance, 100);
        assert_eq!(account.version(), 1);
        assert!(!account.has_shipping_address());
    }

    #[test]
    fn test_open_with_blank_name_fails() {
        let result = AccountAggregate::handle_initial_command(&AccountCommand::OpenAccount {
            display_name: "  ".to_string(),
            starting_points: 0,
        });
        assert!(matches!(result, Err(AccountError::EmptyDisplayName)));
    }

    #[test]
    fn test_first_event_must_be_opened() {
        let event = AccountEvent::PointsCredited(PointsCredited {
            amount: 5,
            reason: AccountCreditReason::Grant { note: None },
        });
        let result = AccountAggregate::apply_first_event(Uuid::new_v4(), &event);
        assert!(matches!(result, Err(AccountError::NotInitialized)));
    }

    #[test]
    fn test_debit_and_credit() {
        let mut account = open(100);

        execute(&mut account, AccountCommand::DebitPoints { amount: 60, order_ids: vec![Uuid::new_v4()] }).unwrap();
        assert_eq!(account.points_balance, 40);

        execute(
            &mut account,
            AccountCommand::CreditPoints {
                amount: 60,
                reason: AccountCreditReason::Refund { order_id: Uuid::new_v4() },
            },
        )
        .unwrap();
        assert_eq!(account.points_balance, 100);
        assert_eq!(account.version(), 3);
    }

    #[test]
    fn test_overdraw_is_rejected_without_change() {
        let mut account = open(40);

        let result = execute(&mut account, AccountCommand::DebitPoints { amount: 60, order_ids: vec![] });
        assert!(matches!(
            result,
            Err(AccountError::InsufficientPoints { required: 60, available: 40 })
        ));
        assert_eq!(account.points_balance, 40);
        assert_eq!(account.version(), 1);
    }

    #[test]
    fn test_zero_amounts_are_rejected() {
        let account = open(10);
        assert!(matches!(
            account.handle_command(&AccountCommand::DebitPoints { amount: 0, order_ids: vec![] }),
            Err(AccountError::ZeroAmount)
        ));
        assert!(matches!(
            account.handle_command(&AccountCommand::CreditPoints {
                amount: 0,
                reason: AccountCreditReason::Grant { note: None },
            }),
            Err(AccountError::ZeroAmount)
        ));
    }

    #[test]
    fn test_credit_overflow_is_rejected() {
        let account = open(u64::MAX);
        let result = account.handle_command(&AccountCommand::CreditPoints {
            amount: 1,
            reason: AccountCreditReason::Grant { note: None },
        });
        assert!(matches!(result, Err(AccountError::BalanceOverflow)));
    }

    #[test]
    fn test_set_address_and_idempotent_repeat() {
        let mut account = open(0);

        execute(&mut account, AccountCommand::SetShippingAddress { address: address() }).unwrap();
        assert_eq!(account.shipping_address, Some(address()));
        assert_eq!(account.version(), 2);

        let events = account
            .handle_command(&AccountCommand::SetShippingAddress { address: address() })
            .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_incomplete_address_is_rejected() {
        let account = open(0);
        let mut incomplete = address();
        incomplete.postal_code.clear();

        let result = account.handle_command(&AccountCommand::SetShippingAddress { address: incomplete });
        assert!(matches!(result, Err(AccountError::IncompleteAddress("postal_code"))));
    }

    #[test]
    fn test_replaying_debit_past_zero_is_corrupt_history() {
        let mut account = open(10);
        let result = account.apply_event(&AccountEvent::PointsDebited(PointsDebited {
            amount: 11,
            order_ids: vec![],
        }));
        assert!(result.is_err());
        assert_eq!(account.points_balance, 10);
    }
}

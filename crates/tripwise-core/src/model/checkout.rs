// ── Checkout draft domain types ──
//
// Every amount in a draft is an integer in the base currency. `total` is a
// stored field that setters recompute from the components; it is never
// written directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::currency::CurrencyCode;
use super::selection::SelectionId;

/// Booking progress. Expected to move forward only.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DraftStatus {
    #[default]
    Draft,
    FormCompleted,
    WaitingPayment,
    PaymentSuccess,
}

impl DraftStatus {
    /// `true` when moving from `self` to `next` does not go backwards.
    pub fn allows(self, next: Self) -> bool {
        next >= self
    }
}

/// Fare product. The multiplier applies to the fare only.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TicketType {
    #[default]
    Standard,
    Flexible,
    Refundable,
}

impl TicketType {
    /// Fare multiplier in basis points (10 000 = ×1).
    pub fn multiplier_bps(self) -> u64 {
        match self {
            Self::Standard => 10_000,
            Self::Flexible => 11_500,
            Self::Refundable => 12_500,
        }
    }

    /// Apply the multiplier to a fare, rounding half up.
    pub fn apply(self, fare: u64) -> u64 {
        let scaled = u128::from(fare) * u128::from(self.multiplier_bps());
        u64::try_from((scaled + 5_000) / 10_000).unwrap_or(u64::MAX)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    VirtualAccount,
    CreditCard,
    EWallet,
    Convenience,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentChoice {
    pub method: PaymentMethod,
    /// Fee in the base currency.
    pub fee: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatChoice {
    pub seat: String,
    pub price: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<chrono::NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

// ── Price lines ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PriceComponent {
    Fare,
    TicketAdjustment,
    Room,
    Extras,
    Seat,
    PaymentFee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLine {
    pub component: PriceComponent,
    pub amount: u64,
}

/// Anything whose total is a sum of base-currency price lines.
pub trait Priced {
    fn price_lines(&self) -> Vec<PriceLine>;

    fn sum_of_lines(&self) -> u64 {
        self.price_lines()
            .iter()
            .fold(0u64, |acc, line| acc.saturating_add(line.amount))
    }
}

/// Draft price in the base currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub currency: CurrencyCode,
    pub lines: Vec<PriceLine>,
    pub total: u64,
}

impl PriceBreakdown {
    pub fn amount(&self, component: PriceComponent) -> u64 {
        self.lines
            .iter()
            .filter(|l| l.component == component)
            .map(|l| l.amount)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvertedLine {
    pub component: PriceComponent,
    pub amount: f64,
}

/// Draft price in the display currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedBreakdown {
    pub currency: CurrencyCode,
    pub lines: Vec<ConvertedLine>,
    pub total: f64,
    /// Set when conversion was impossible and base amounts are shown instead.
    pub fallback: bool,
}

// ── Drafts ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightDraft {
    pub booking_id: SelectionId,
    pub status: DraftStatus,
    pub ticket_type: TicketType,
    pub base_fare: u64,
    pub passengers: Vec<Passenger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    pub extras_total: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat: Option<SeatChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentChoice>,
    pub total: u64,
    pub updated_at: DateTime<Utc>,
}

impl FlightDraft {
    pub fn new(booking_id: SelectionId, base_fare: u64) -> Self {
        let mut draft = Self {
            booking_id,
            status: DraftStatus::Draft,
            ticket_type: TicketType::default(),
            base_fare,
            passengers: Vec::new(),
            contact: None,
            extras_total: 0,
            seat: None,
            payment: None,
            total: 0,
            updated_at: Utc::now(),
        };
        draft.total = draft.sum_of_lines();
        draft
    }

    /// Fare after the ticket-type multiplier.
    pub fn adjusted_fare(&self) -> u64 {
        self.ticket_type.apply(self.base_fare)
    }
}

impl Priced for FlightDraft {
    fn price_lines(&self) -> Vec<PriceLine> {
        let adjusted = self.adjusted_fare();
        vec![
            PriceLine {
                component: PriceComponent::Fare,
                amount: self.base_fare,
            },
            PriceLine {
                component: PriceComponent::TicketAdjustment,
                amount: adjusted.saturating_sub(self.base_fare),
            },
            PriceLine {
                component: PriceComponent::Extras,
                amount: self.extras_total,
            },
            PriceLine {
                component: PriceComponent::Seat,
                amount: self.seat.as_ref().map_or(0, |s| s.price),
            },
            PriceLine {
                component: PriceComponent::PaymentFee,
                amount: self.payment.as_ref().map_or(0, |p| p.fee),
            },
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelDraft {
    pub booking_id: SelectionId,
    pub status: DraftStatus,
    pub nightly_rate: u64,
    pub nights: u32,
    pub rooms: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest: Option<Contact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_request: Option<String>,
    pub extras_total: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentChoice>,
    pub total: u64,
    pub updated_at: DateTime<Utc>,
}

impl HotelDraft {
    pub fn new(booking_id: SelectionId, nightly_rate: u64, nights: u32) -> Self {
        let mut draft = Self {
            booking_id,
            status: DraftStatus::Draft,
            nightly_rate,
            nights: nights.max(1),
            rooms: 1,
            guest: None,
            special_request: None,
            extras_total: 0,
            payment: None,
            total: 0,
            updated_at: Utc::now(),
        };
        draft.total = draft.sum_of_lines();
        draft
    }

    pub fn room_subtotal(&self) -> u64 {
        self.nightly_rate
            .saturating_mul(u64::from(self.nights))
            .saturating_mul(u64::from(self.rooms))
    }
}

impl Priced for HotelDraft {
    fn price_lines(&self) -> Vec<PriceLine> {
        vec![
            PriceLine {
                component: PriceComponent::Room,
                amount: self.room_subtotal(),
            },
            PriceLine {
                component: PriceComponent::Extras,
                amount: self.extras_total,
            },
            PriceLine {
                component: PriceComponent::PaymentFee,
                amount: self.payment.as_ref().map_or(0, |p| p.fee),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_multiplier_rounds_half_up() {
        assert_eq!(TicketType::Standard.apply(1_000_000), 1_000_000);
        assert_eq!(TicketType::Flexible.apply(1_000_000), 1_150_000);
        assert_eq!(TicketType::Refundable.apply(3), 4);
        assert_eq!(TicketType::Flexible.apply(1), 1);
    }

    #[test]
    fn status_order() {
        assert!(DraftStatus::Draft.allows(DraftStatus::FormCompleted));
        assert!(DraftStatus::WaitingPayment.allows(DraftStatus::WaitingPayment));
        assert!(!DraftStatus::PaymentSuccess.allows(DraftStatus::Draft));
    }

    #[test]
    fn flight_lines_sum_to_adjusted_total() {
        let mut draft = FlightDraft::new(SelectionId::new(), 1_000_000);
        draft.ticket_type = TicketType::Flexible;
        draft.extras_total = 200_000;
        draft.seat = Some(SeatChoice {
            seat: "12A".into(),
            price: 50_000,
        });
        assert_eq!(draft.sum_of_lines(), 1_150_000 + 200_000 + 50_000);
    }

    #[test]
    fn hotel_room_subtotal() {
        let mut draft = HotelDraft::new(SelectionId::new(), 750_000, 3);
        draft.rooms = 2;
        assert_eq!(draft.room_subtotal(), 4_500_000);
        assert_eq!(draft.sum_of_lines(), 4_500_000);
    }
}

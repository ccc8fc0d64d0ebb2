// ── Flight result generator ──
//
// Deterministic stand-in for a fare search backend. The RNG is seeded from
// the configured seed and an FNV-1a hash of the serialized search
// parameters, so repeating a search reproduces the same ids, times and
// prices on every toolchain and platform.

use chrono::{Duration as ChronoDuration, NaiveTime};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::model::{
    Airline, CabinClass, FlightLeg, FlightType, OneWayResult, RoundTripResult, Route,
    SearchParams, SearchResult, TripType, format_duration,
};

const AIRLINES: &[(&str, &str)] = &[
    ("GA", "Garuda Indonesia"),
    ("JT", "Lion Air"),
    ("QG", "Citilink"),
    ("ID", "Batik Air"),
    ("QZ", "Indonesia AirAsia"),
    ("SJ", "Sriwijaya Air"),
];

const AIRCRAFT: &[&str] = &[
    "Boeing 737-800",
    "Boeing 737 MAX 8",
    "Airbus A320",
    "Airbus A320neo",
    "Airbus A330-300",
    "ATR 72-600",
];

const TRANSIT_HUBS: &[&str] = &["SUB", "UPG", "KNO", "BPN", "YIA"];

/// Round-trip bundles are priced at 90% of the leg sum.
const BUNDLE_BPS: u64 = 9_000;

/// Fares are quoted in whole thousands of the base currency.
const FARE_STEP: u64 = 1_000;

fn cabin_bps(cabin: CabinClass) -> u64 {
    match cabin {
        CabinClass::Economy => 10_000,
        CabinClass::PremiumEconomy => 16_000,
        CabinClass::Business => 30_000,
        CabinClass::First => 50_000,
    }
}

fn scale_bps(amount: u64, bps: u64) -> u64 {
    let scaled = u128::from(amount) * u128::from(bps) / 10_000;
    let rounded = scaled / u128::from(FARE_STEP) * u128::from(FARE_STEP);
    u64::try_from(rounded).unwrap_or(u64::MAX)
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(hash: u64, bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(hash, |h, b| (h ^ u64::from(*b)).wrapping_mul(FNV_PRIME))
}

/// Seed for one search, fixed for a given generator seed and parameters.
fn stable_seed(seed: u64, params: &SearchParams) -> u64 {
    // Serializing plain data cannot fail; an empty key still seeds.
    let key = serde_json::to_vec(params).unwrap_or_default();
    fnv1a(fnv1a(FNV_OFFSET, &seed.to_le_bytes()), &key)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlightGenerator {
    seed: u64,
}

impl FlightGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn rng_for(&self, params: &SearchParams) -> StdRng {
        StdRng::seed_from_u64(stable_seed(self.seed, params))
    }

    /// Generate roughly `params.result_count` results (±20%).
    pub fn generate(&self, params: &SearchParams) -> Vec<SearchResult> {
        let target = params.result_count;
        if target == 0 {
            return Vec::new();
        }

        let mut rng = self.rng_for(params);
        let spread = (target / 5).max(1);
        let count = rng
            .gen_range(target.saturating_sub(spread)..=target + spread)
            .max(1);

        let round_trip =
            matches!(params.trip_type, TripType::RoundTrip) && params.return_date.is_some();
        let results: Vec<SearchResult> = (1..=count)
            .map(|n| {
                if round_trip {
                    Self::round_trip(&mut rng, params, n)
                } else {
                    Self::one_way(&mut rng, params, n)
                }
            })
            .collect();

        debug!(
            seed = self.seed,
            requested = target,
            generated = results.len(),
            round_trip,
            "generated flight results"
        );
        results
    }

    fn one_way(rng: &mut StdRng, params: &SearchParams, n: usize) -> SearchResult {
        let origin = pick_code(rng, &params.origin);
        let destination = pick_code(rng, &params.destination);
        let (leg, fare) = random_leg(rng, params.cabin_class, origin, destination);
        SearchResult::OneWay(OneWayResult {
            id: format!("FL-{n:04}"),
            price: fare,
            leg,
        })
    }

    fn round_trip(rng: &mut StdRng, params: &SearchParams, n: usize) -> SearchResult {
        let origin = pick_code(rng, &params.origin);
        let destination = pick_code(rng, &params.destination);
        let (outbound, out_fare) =
            random_leg(rng, params.cabin_class, origin.clone(), destination.clone());
        let (inbound, in_fare) = random_leg(rng, params.cabin_class, destination, origin);
        SearchResult::RoundTrip(RoundTripResult {
            id: format!("RT-{n:04}"),
            outbound,
            inbound,
            total_price: scale_bps(out_fare.saturating_add(in_fare), BUNDLE_BPS),
        })
    }
}

fn pick_code(rng: &mut StdRng, codes: &[String]) -> String {
    codes.choose(rng).cloned().unwrap_or_default()
}

fn random_leg(
    rng: &mut StdRng,
    cabin: CabinClass,
    origin: String,
    destination: String,
) -> (FlightLeg, u64) {
    let &(code, name) = AIRLINES.choose(rng).unwrap_or(&("GA", "Garuda Indonesia"));
    let aircraft = AIRCRAFT.choose(rng).copied().unwrap_or("Airbus A320");
    let direct = rng.gen_bool(0.6);

    let block_minutes: u32 = if direct {
        rng.gen_range(60..=180)
    } else {
        rng.gen_range(150..=420)
    };
    let departure = NaiveTime::from_hms_opt(rng.gen_range(0..24), rng.gen_range(0..12) * 5, 0)
        .unwrap_or(NaiveTime::MIN);
    let arrival = departure + ChronoDuration::minutes(i64::from(block_minutes));

    let mut fare = rng.gen_range(550..=2_500) * FARE_STEP;
    if !direct {
        fare = scale_bps(fare, 8_500);
    }
    let fare = scale_bps(fare, cabin_bps(cabin));

    let leg = FlightLeg {
        flight_number: format!("{code}-{}", rng.gen_range(100..=999)),
        airline: Airline {
            code: code.into(),
            name: name.into(),
        },
        aircraft: aircraft.into(),
        flight_type: if direct {
            FlightType::Direct
        } else {
            FlightType::Transit
        },
        departure_time: departure,
        arrival_time: arrival,
        duration: format_duration(block_minutes),
        route: Route {
            origin,
            destination,
        },
        transit_airport: if direct {
            None
        } else {
            TRANSIT_HUBS.choose(rng).map(|h| (*h).to_owned())
        },
    };
    (leg, fare)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn params(trip_type: TripType) -> SearchParams {
        SearchParams {
            origin: vec!["CGK".into(), "HLP".into()],
            destination: vec!["DPS".into()],
            departure_date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            return_date: match trip_type {
                TripType::OneWay => None,
                TripType::RoundTrip => NaiveDate::from_ymd_opt(2026, 11, 9),
            },
            passengers: 2,
            cabin_class: CabinClass::Economy,
            trip_type,
            result_count: 30,
        }
    }

    #[test]
    fn same_search_reproduces_results() {
        let generator = FlightGenerator::new(7);
        let a = generator.generate(&params(TripType::OneWay));
        let b = generator.generate(&params(TripType::OneWay));
        assert_eq!(a, b);
    }

    #[test]
    fn fnv1a_matches_reference_vectors() {
        assert_eq!(fnv1a(FNV_OFFSET, b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a(FNV_OFFSET, b"a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(fnv1a(FNV_OFFSET, b"foobar"), 0x8594_4171_f739_67e8);
    }

    #[test]
    fn search_seed_depends_on_seed_and_params() {
        let one_way = params(TripType::OneWay);
        let seed = stable_seed(7, &one_way);
        assert_eq!(seed, stable_seed(7, &params(TripType::OneWay)));
        assert_ne!(seed, stable_seed(8, &one_way));
        assert_ne!(seed, stable_seed(7, &params(TripType::RoundTrip)));
    }

    #[test]
    fn count_is_near_target() {
        let results = FlightGenerator::new(1).generate(&params(TripType::OneWay));
        assert!((24..=36).contains(&results.len()), "{}", results.len());
        assert_eq!(results[0].id(), "FL-0001");
    }

    #[test]
    fn round_trip_price_is_a_bundle() {
        let results = FlightGenerator::new(3).generate(&params(TripType::RoundTrip));
        assert!(!results.is_empty());
        for result in &results {
            let SearchResult::RoundTrip(rt) = result else {
                panic!("expected round trip");
            };
            assert_eq!(rt.outbound.route.origin, rt.inbound.route.destination);
            assert_eq!(rt.total_price % FARE_STEP, 0);
            assert!(rt.total_price > 0);
        }
    }

    #[test]
    fn legs_are_consistent() {
        for result in FlightGenerator::new(11).generate(&params(TripType::OneWay)) {
            let leg = result.primary_leg();
            assert!(leg.duration_minutes() >= 60);
            assert_eq!(leg.is_direct(), leg.transit_airport.is_none());
            assert!(result.display_price() >= FARE_STEP);
        }
    }

    #[test]
    fn zero_target_is_empty() {
        let mut p = params(TripType::OneWay);
        p.result_count = 0;
        assert!(FlightGenerator::new(0).generate(&p).is_empty());
    }
}

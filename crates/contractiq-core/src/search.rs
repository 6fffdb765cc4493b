//! Local contract filtering for the dashboard search box.

use crate::contract::Contract;

/// True when `term` occurs in the filename or the status, ignoring case.
/// The empty term matches everything.
pub fn matches_term(contract: &Contract, term: &str) -> bool {
    let needle = term.to_lowercase();
    contract.filename.to_lowercase().contains(&needle) || contract.status.as_str().contains(&needle)
}

/// Filter an already-fetched list, preserving its order.
pub fn filter_contracts<'a>(contracts: &'a [Contract], term: &str) -> Vec<&'a Contract> {
    contracts.iter().filter(|c| matches_term(c, term)).collect()
}

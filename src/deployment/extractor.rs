use alloy::primitives::{Address, B256};
use log::debug;

use crate::chain::ReceiptLog;

const ADDRESS_LEN: usize = 20;

/// Work out the address of a freshly created token from the receipt logs.
///
/// The precompile does not return the address directly, so it is inferred from
/// the emitted logs:
/// 1. a log emitted by `factory` whose data ends in the address word;
/// 2. otherwise a mint-style log (three topics, zero `from`), whose emitter is the token.
///
/// Returns `None` when neither shape is present.
pub fn extract_token_address(logs: &[ReceiptLog], factory: Address) -> Option<Address> {
    if let Some(address) = logs
        .iter()
        .filter(|log| log.address == factory)
        .find_map(address_from_factory_log)
    {
        debug!("Token address found in factory log: {:?}", address);
        return Some(address);
    }

    let minted = logs.iter().find(|log| is_mint_log(log)).map(|log| log.address);
    match minted {
        Some(address) => debug!("Token address inferred from mint log: {:?}", address),
        None => {
            for log in logs {
                debug!(
                    "Unrecognised log from {:?}: {} topic(s), data 0x{}",
                    log.address,
                    log.topics.len(),
                    hex::encode(&log.data)
                );
            }
        }
    }
    minted
}

/// Trailing 20 bytes of the data payload, the left-padded 32-byte word convention
fn address_from_factory_log(log: &ReceiptLog) -> Option<Address> {
    if log.data.len() < ADDRESS_LEN {
        return None;
    }
    let address = Address::from_slice(&log.data[log.data.len() - ADDRESS_LEN..]);
    (!address.is_zero()).then_some(address)
}

fn is_mint_log(log: &ReceiptLog) -> bool {
    log.topics.len() == 3 && log.topics[1] == B256::ZERO && !log.address.is_zero()
}

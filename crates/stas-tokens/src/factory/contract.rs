//! Contract transaction builder.
//!
//! The contract transaction commits the token schema on chain and sets
//! aside the satoshis that back the supply. Its first output is later
//! spent by the issue transaction.

use stas_script::Script;
use stas_transaction::{Transaction, TransactionOutput};

use crate::config::EngineConfig;
use crate::error::TokenError;
use crate::factory::draft::{require_signer, Draft, UnlockKind};
use crate::schema::TokenSchema;
use crate::script::builder::build_contract_script;
use crate::signer::InputSigner;
use crate::types::{TokenOperation, Utxo};
use crate::util::satoshis_to_tokens;
use crate::validate::checked_sum;

/// Request for a contract transaction.
pub struct ContractRequest<'a> {
    /// The token schema to commit.
    pub schema: TokenSchema,
    /// P2PKH outputs of the issuer backing the token pool.
    pub capital: Vec<Utxo>,
    /// Signer for the capital inputs; its key hash is the token id.
    pub issuer: Option<&'a dyn InputSigner>,
    /// Satoshis committed to the token pool.
    pub token_satoshis: u64,
    /// Optional fee funding UTXO (P2PKH).
    pub funding: Option<Utxo>,
    /// Signer for the funding UTXO.
    pub funding_signer: Option<&'a dyn InputSigner>,
}

/// Build a contract transaction.
///
/// # Transaction structure
/// - Inputs 0..N-1: issuer capital UTXOs (P2PKH)
/// - Input N: funding UTXO (P2PKH), if any
/// - Output 0: contract commitment (P2PKH to issuer, OP_RETURN schema JSON)
/// - Output 1: issuer change, if the capital exceeds the pool
/// - Last output: funding change, if any
pub fn build_contract_tx(
    request: &ContractRequest<'_>,
    config: &EngineConfig,
) -> Result<Transaction, TokenError> {
    let issuer = require_signer(request.issuer, "issuer")?;
    let schema = &request.schema;
    schema.validate()?;

    let issuer_hash = schema.issuer_hash()?;
    let signer_hash = issuer.public_key().hash160();
    if signer_hash != issuer_hash {
        return Err(TokenError::InconsistentIssuer(format!(
            "issuer key {} does not match token id {}",
            hex::encode(signer_hash),
            schema.token_id
        )));
    }

    if request.capital.is_empty() {
        return Err(TokenError::InvalidAmount(
            "at least one capital utxo is required".into(),
        ));
    }
    if request.token_satoshis == 0 {
        return Err(TokenError::InvalidAmount(
            "token satoshis must be greater than zero".into(),
        ));
    }
    let units = satoshis_to_tokens(request.token_satoshis, schema.satoshis_per_token)?;
    if units > schema.total_supply {
        return Err(TokenError::InvalidAmount(format!(
            "{} tokens exceeds total supply {}",
            units, schema.total_supply
        )));
    }
    let capital_total = checked_sum(request.capital.iter().map(|utxo| utxo.satoshis))?;
    if capital_total < request.token_satoshis {
        return Err(TokenError::InvalidAmount(format!(
            "capital of {} satoshis cannot back {} token satoshis",
            capital_total, request.token_satoshis
        )));
    }

    let mut draft = Draft::new(TokenOperation::Contract, vec![issuer])
        .with_supply_cap(schema.max_satoshis()?);
    for utxo in &request.capital {
        let holder = utxo.locking_script.public_key_hash().map_err(|_| {
            TokenError::MalformedScript("capital utxo is not P2PKH".into())
        })?;
        draft.add_owner_input(utxo, UnlockKind::PayToKeyHash, 0, &holder, false)?;
    }

    draft.add_token_output(
        request.token_satoshis,
        build_contract_script(&issuer_hash, schema)?,
    )?;
    let excess = capital_total - request.token_satoshis;
    if excess >= config.dust_limit.max(1) {
        draft.add_output(TransactionOutput::change(excess, Script::p2pkh(&issuer_hash)));
    }

    draft.complete(request.funding.as_ref(), request.funding_signer, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::stas::tests::{p2pkh_utxo, Party};
    use crate::schema::tests::sample_schema;
    use crate::script::reader::parse_contract_script;

    #[test]
    fn contract_tx_structure() {
        let issuer = Party::new();
        let funder = Party::new();
        let request = ContractRequest {
            schema: sample_schema(&issuer.hash()),
            capital: vec![p2pkh_utxo(&issuer, 12_000)],
            issuer: Some(&issuer.signer),
            token_satoshis: 10_000,
            funding: Some(p2pkh_utxo(&funder, 50_000)),
            funding_signer: Some(&funder.signer),
        };

        let tx = build_contract_tx(&request, &EngineConfig::default()).unwrap();
        assert_eq!(tx.inputs.len(), 2);
        assert_eq!(tx.outputs.len(), 3);
        assert_eq!(tx.outputs[0].satoshis, 10_000);
        let (issuer_hash, schema) = parse_contract_script(tx.outputs[0].locking_script.to_bytes()).unwrap();
        assert_eq!(issuer_hash, issuer.hash());
        assert_eq!(schema, request.schema);
        // issuer change, then funding change
        assert_eq!(tx.outputs[1].satoshis, 2000);
        assert_eq!(tx.outputs[1].locking_script, Script::p2pkh(&issuer.hash()));
        assert_eq!(tx.outputs[2].locking_script, Script::p2pkh(&funder.hash()));
        assert!(tx.outputs[2].satoshis < 50_000);
        assert!(tx.inputs.iter().all(|input| input.unlocking_script.is_some()));
    }

    #[test]
    fn contract_zero_fee() {
        let issuer = Party::new();
        let request = ContractRequest {
            schema: sample_schema(&issuer.hash()),
            capital: vec![p2pkh_utxo(&issuer, 10_000)],
            issuer: Some(&issuer.signer),
            token_satoshis: 10_000,
            funding: None,
            funding_signer: None,
        };
        let tx = build_contract_tx(&request, &EngineConfig::default()).unwrap();
        assert_eq!(tx.inputs.len(), 1);
        assert_eq!(tx.outputs.len(), 1);
    }

    #[test]
    fn contract_rejects_foreign_issuer() {
        let issuer = Party::new();
        let other = Party::new();
        let request = ContractRequest {
            schema: sample_schema(&other.hash()),
            capital: vec![p2pkh_utxo(&issuer, 10_000)],
            issuer: Some(&issuer.signer),
            token_satoshis: 10_000,
            funding: None,
            funding_signer: None,
        };
        assert!(matches!(
            build_contract_tx(&request, &EngineConfig::default()),
            Err(TokenError::InconsistentIssuer(_))
        ));
    }

    #[test]
    fn contract_amount_rules() {
        let issuer = Party::new();
        let mut schema = sample_schema(&issuer.hash());
        schema.satoshis_per_token = 100;
        schema.total_supply = 100;
        let base = |token_satoshis: u64, capital: u64| ContractRequest {
            schema: schema.clone(),
            capital: vec![p2pkh_utxo(&issuer, capital)],
            issuer: Some(&issuer.signer),
            token_satoshis,
            funding: None,
            funding_signer: None,
        };
        let config = EngineConfig::default();

        assert!(build_contract_tx(&base(10_000, 10_000), &config).is_ok());
        for request in [base(0, 10_000), base(10_050, 20_000), base(10_100, 20_000), base(10_000, 9_000)] {
            assert!(matches!(
                build_contract_tx(&request, &config),
                Err(TokenError::InvalidAmount(_))
            ));
        }
    }

    #[test]
    fn contract_spends_each_capital_outpoint_once() {
        let issuer = Party::new();
        let capital = p2pkh_utxo(&issuer, 5000);
        let mut request = ContractRequest {
            schema: sample_schema(&issuer.hash()),
            capital: vec![capital.clone(), capital.clone()],
            issuer: Some(&issuer.signer),
            token_satoshis: 10_000,
            funding: None,
            funding_signer: None,
        };
        assert!(matches!(
            build_contract_tx(&request, &EngineConfig::default()),
            Err(TokenError::InvalidAmount(_))
        ));

        // the funding input may not respend a capital outpoint either
        request.capital = vec![p2pkh_utxo(&issuer, 10_000)];
        request.funding = Some(request.capital[0].clone());
        request.funding_signer = Some(&issuer.signer);
        assert!(matches!(
            build_contract_tx(&request, &EngineConfig::default()),
            Err(TokenError::InvalidAmount(_))
        ));
    }

    #[test]
    fn contract_requires_signers() {
        let issuer = Party::new();
        let funder = Party::new();
        let mut request = ContractRequest {
            schema: sample_schema(&issuer.hash()),
            capital: vec![p2pkh_utxo(&issuer, 10_000)],
            issuer: None,
            token_satoshis: 10_000,
            funding: None,
            funding_signer: None,
        };
        assert!(matches!(
            build_contract_tx(&request, &EngineConfig::default()),
            Err(TokenError::MissingSigner(_))
        ));

        request.issuer = Some(&issuer.signer);
        request.funding = Some(p2pkh_utxo(&funder, 50_000));
        assert!(matches!(
            build_contract_tx(&request, &EngineConfig::default()),
            Err(TokenError::MissingSigner(_))
        ));
    }
}

// Copyright (c) 2023-2024 IOTA Stiftung

//! Transaction signing session and transfer assembly
//!
//! [TransactionSigner] sequences the device commands for one transaction:
//! account selection, address derivation, essence upload through the data
//! buffer, remainder declaration, on-device confirmation and one unlock
//! per input. The session is linear and non-retryable; any failure aborts
//! the whole build and the caller may restart from idle.

use log::debug;

use ledger_stardust_apdu::signing::{
    PrepareSigningReq, SignSingleReq, Unlock, UserConfirmEssenceReq,
};

use crate::{
    client::NodeClient,
    currency::Currency,
    essence::build_essence,
    handle::DeviceHandle,
    select::{select_inputs, DEFAULT_MAX_CONSECUTIVE_EMPTY},
    transport::{Transport, TIMEOUT_CMD_NON_USER_INTERACTION, TIMEOUT_CMD_USER_INTERACTION},
    types::{BasicOutput, Ed25519Address, TransactionPayload},
    Error,
};

/// Signing session state, linear and non-retryable per attempt
#[derive(Copy, Clone, PartialEq, Eq, Debug, strum::Display)]
pub enum SessionState {
    Idle,
    AccountSelected,
    AddressGenerated,
    EssenceUploaded,
    SigningPrepared,
    EssenceConfirmed,
    Signing,
    Done,
}

/// Remainder position within the essence outputs, with the derivation
/// indices of the address it returns to
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Remainder {
    /// Index of the remainder output within the essence outputs
    pub output_index: u16,

    /// BIP32 address index of the remainder address (hardened)
    pub bip32_index: u32,

    /// BIP32 change level of the remainder address (hardened)
    pub bip32_change: u32,
}

/// Transfer request: a single recipient and amount
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Transfer {
    /// Recipient address
    pub recipient: Ed25519Address,

    /// Amount in base units
    pub amount: u64,
}

/// Configuration for a signing session
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TxConfig {
    /// Target currency
    pub currency: Currency,

    /// BIP32 account index (hardened)
    pub account_index: u32,

    /// BIP32 change level of the signing address (hardened)
    pub bip32_change: u32,

    /// BIP32 address index of the signing address (hardened)
    pub bip32_index: u32,
}

/// A signed transfer: the assembled payload plus the exact essence bytes
/// the device confirmed and signed
#[derive(Clone, PartialEq, Debug)]
pub struct SignedTransfer {
    pub payload: TransactionPayload,
    pub essence_bytes: Vec<u8>,
}

/// Hardware signing session for a single transaction.
///
/// Borrows the device handle exclusively: the secure element processes one
/// conversation at a time and its buffer state is global per device.
pub struct TransactionSigner<'a, T: Transport> {
    device: &'a mut DeviceHandle<T>,
    config: TxConfig,
    state: SessionState,
    num_inputs: usize,
}

impl<'a, T: Transport> TransactionSigner<'a, T> {
    /// Start a new (idle) signing session
    pub fn new(device: &'a mut DeviceHandle<T>, config: TxConfig) -> Self {
        Self {
            device,
            config,
            state: SessionState::Idle,
            num_inputs: 0,
        }
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.state
    }

    fn check_state(&self, expected: SessionState) -> Result<(), Error<T::Error>> {
        if self.state != expected {
            return Err(Error::InvalidState(self.state, expected));
        }
        Ok(())
    }

    /// Select the signing account on the device
    pub async fn select_account(&mut self) -> Result<(), Error<T::Error>> {
        self.check_state(SessionState::Idle)?;

        self.device
            .set_account(self.config.currency, self.config.account_index)
            .await?;

        self.state = SessionState::AccountSelected;
        Ok(())
    }

    /// Derive the signing address and read it back from the data buffer.
    ///
    /// With `verify` set the device blocks on user confirmation of the
    /// displayed address; rejection surfaces as [Error::UserRejected].
    pub async fn generate_address(&mut self, verify: bool) -> Result<Vec<u8>, Error<T::Error>> {
        self.check_state(SessionState::AccountSelected)?;

        self.device
            .generate_address(self.config.bip32_change, self.config.bip32_index, 1, verify)
            .await?;
        let data = self.device.read_buffer().await?;

        self.state = SessionState::AddressGenerated;
        Ok(data)
    }

    /// Upload essence bytes to the device data buffer
    pub async fn upload_essence(
        &mut self,
        essence: &[u8],
        num_inputs: usize,
    ) -> Result<(), Error<T::Error>> {
        self.check_state(SessionState::AddressGenerated)?;

        if num_inputs == 0 {
            return Err(Error::Precondition("essence has no inputs"));
        }

        self.device.write_buffer(essence).await?;

        self.num_inputs = num_inputs;
        self.state = SessionState::EssenceUploaded;
        Ok(())
    }

    /// Declare the remainder output (if any) and its deriving indices.
    ///
    /// `None` signals an essence without a remainder.
    pub async fn prepare_signing(
        &mut self,
        remainder: Option<Remainder>,
    ) -> Result<(), Error<T::Error>> {
        self.check_state(SessionState::EssenceUploaded)?;

        let req = match remainder {
            Some(r) => {
                PrepareSigningReq::with_remainder(r.output_index, r.bip32_index, r.bip32_change)
            }
            None => PrepareSigningReq::no_remainder(),
        };

        self.device
            .command(req, TIMEOUT_CMD_USER_INTERACTION)
            .await?;

        self.state = SessionState::SigningPrepared;
        Ok(())
    }

    /// Display the essence on-device and block for user accept / reject.
    ///
    /// Rejection aborts the session with no partial signatures returned.
    pub async fn confirm_essence(&mut self) -> Result<(), Error<T::Error>> {
        self.check_state(SessionState::SigningPrepared)?;

        self.device
            .command(UserConfirmEssenceReq, TIMEOUT_CMD_USER_INTERACTION)
            .await?;

        self.state = SessionState::EssenceConfirmed;
        Ok(())
    }

    /// Fetch the unlock for a single input.
    ///
    /// The response's leading byte discriminates a signature unlock from a
    /// back-reference; an unrecognised discriminator is a fatal
    /// [Error::InvalidVariant].
    pub async fn sign_single(&mut self, index: u8) -> Result<Unlock, Error<T::Error>> {
        if self.state != SessionState::EssenceConfirmed && self.state != SessionState::Signing {
            return Err(Error::InvalidState(self.state, SessionState::EssenceConfirmed));
        }
        self.state = SessionState::Signing;

        let unlock = self
            .device
            .request::<Unlock>(SignSingleReq::new(index), TIMEOUT_CMD_NON_USER_INTERACTION)
            .await?;

        Ok(unlock)
    }

    /// Collect one unlock per input, completing the session
    pub async fn sign_all(&mut self) -> Result<Vec<Unlock>, Error<T::Error>> {
        let mut unlocks = Vec::with_capacity(self.num_inputs);

        for i in 0..self.num_inputs {
            let unlock = self.sign_single(i as u8).await?;

            match &unlock {
                Unlock::Signature { .. } => debug!("Input {i}: signature unlock"),
                Unlock::Reference { index } => debug!("Input {i}: reference unlock -> {index}"),
            }

            unlocks.push(unlock);
        }

        self.state = SessionState::Done;
        Ok(unlocks)
    }
}

/// Build and sign a transfer end to end.
///
/// Derives the sender address for the configured account, selects inputs
/// through the node client, appends the remainder output when the consumed
/// amount exceeds the transfer, serializes the essence, and drives the
/// device session through confirmation and per-input signing. Any failure
/// (transport, selection, user rejection) aborts the whole build.
pub async fn build_transaction_payload<T, C>(
    device: &mut DeviceHandle<T>,
    client: &C,
    config: &TxConfig,
    transfer: &Transfer,
) -> Result<SignedTransfer, Error<T::Error>>
where
    T: Transport,
    C: NodeClient,
{
    if transfer.amount == 0 {
        return Err(Error::Precondition("transfer amount is zero"));
    }

    let currency = config.currency.config();

    let mut signer = TransactionSigner::new(device, config.clone());

    // Account and signing address
    signer.select_account().await?;
    let address_data = signer.generate_address(false).await?;

    let own = Ed25519Address::from_prefixed_bytes(&address_data)?;
    let own_bech32 = own.to_bech32(currency.bech32_hrp)?;

    debug!(
        "Selecting inputs for {} against {}",
        transfer.amount, own_bech32
    );
    let selection = select_inputs(
        client,
        &own_bech32,
        transfer.amount,
        DEFAULT_MAX_CONSECUTIVE_EMPTY,
    )
    .await?;

    // Recipient output first, then the remainder back to the signing address
    let mut outputs = vec![BasicOutput::new(transfer.recipient, transfer.amount)];
    let remainder = match selection.remainder {
        0 => None,
        excess => {
            outputs.push(BasicOutput::new(own, excess));
            Some(Remainder {
                output_index: (outputs.len() - 1) as u16,
                bip32_index: config.bip32_index,
                bip32_change: config.bip32_change,
            })
        }
    };

    let built = build_essence(currency.network_id, &selection.inputs, &outputs)?;

    // Device confirmation and per-input unlocks
    signer
        .upload_essence(&built.bytes, selection.inputs.len())
        .await?;
    signer.prepare_signing(remainder).await?;
    signer.confirm_essence().await?;
    let unlocks = signer.sign_all().await?;

    debug!("Signing complete: {} unlock(s)", unlocks.len());

    Ok(SignedTransfer {
        payload: TransactionPayload {
            essence: built.essence,
            unlocks,
        },
        essence_bytes: built.bytes,
    })
}

use chrono::Utc;
use orderer_types::{
    encode, ChannelHeader, ChannelId, Envelope, Header, HeaderType, Payload,
};
use serde::Serialize;

use crate::error::CryptoError;
use crate::signer::LocalSigner;

/// Build an envelope of `header_type` for `channel_id` around `data`, signed by `signer`.
///
/// Each call gets a fresh transaction id and timestamp.
pub fn create_signed_envelope<T: Serialize>(
    header_type: HeaderType,
    channel_id: &ChannelId,
    signer: &dyn LocalSigner,
    data: &T,
) -> Result<Envelope, CryptoError> {
    let payload = Payload {
        header: Header {
            channel_header: ChannelHeader {
                header_type,
                channel_id: channel_id.clone(),
                tx_id: uuid::Uuid::new_v4().to_string(),
                timestamp: Utc::now(),
                epoch: 0,
            },
            signature_header: signer.new_signature_header()?,
        },
        data: encode(data)?,
    };

    let payload = payload.encode()?;
    let signature = signer.sign(&payload)?;
    Ok(Envelope { payload, signature })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::{verify, Ed25519Signer};

    #[test]
    fn envelope_is_signed_by_creator() {
        let signer = Ed25519Signer::generate();
        let channel = ChannelId::from("mychannel");
        let env =
            create_signed_envelope(HeaderType::Message, &channel, &signer, &"payload").unwrap();

        let payload = env.payload().unwrap();
        assert_eq!(payload.header.channel_header.channel_id, channel);
        assert_eq!(payload.header.channel_header.header_type, HeaderType::Message);
        verify(
            &payload.header.signature_header.creator,
            &env.payload,
            &env.signature,
        )
        .unwrap();
    }

    #[test]
    fn tx_ids_are_unique() {
        let signer = Ed25519Signer::generate();
        let channel = ChannelId::from("mychannel");
        let a = create_signed_envelope(HeaderType::Message, &channel, &signer, &1u8).unwrap();
        let b = create_signed_envelope(HeaderType::Message, &channel, &signer, &1u8).unwrap();
        assert_ne!(
            a.channel_header().unwrap().tx_id,
            b.channel_header().unwrap().tx_id
        );
    }
}

//! Config blocks: building a channel's genesis block and reading the config
//! envelope a config block carries.

use chrono::Utc;
use orderer_types::{
    encode, Block, BlockMetadataIndex, ChannelHeader, ChannelId, Config, ConfigEnvelope, Envelope,
    Header, HeaderType, LastConfig, Metadata, Payload, SignatureHeader, TypesError,
};

/// Block 0 of a new channel, carrying `config` as an unsigned config envelope.
pub fn genesis_block(channel_id: &ChannelId, config: Config) -> Result<Block, TypesError> {
    let config_env = ConfigEnvelope {
        config,
        last_update: Envelope::default(),
    };
    let payload = Payload {
        header: Header {
            channel_header: ChannelHeader {
                header_type: HeaderType::Config,
                channel_id: channel_id.clone(),
                tx_id: uuid::Uuid::new_v4().to_string(),
                timestamp: Utc::now(),
                epoch: 0,
            },
            signature_header: SignatureHeader::default(),
        },
        data: config_env.encode()?,
    };
    let env = Envelope {
        payload: payload.encode()?,
        signature: Vec::new(),
    };

    let mut block = Block::new(0, Vec::new());
    block.data.data.push(env.encode()?);
    block.header.data_hash = block.data.hash();
    block.set_metadata(
        BlockMetadataIndex::LastConfig,
        &Metadata::with_value(encode(&LastConfig { index: 0 })?),
    )?;
    Ok(block)
}

/// The channel and config envelope carried by a config block's single transaction.
pub fn config_envelope_from_block(
    block: &Block,
) -> Result<(ChannelId, ConfigEnvelope), TypesError> {
    let raw = block
        .data
        .data
        .first()
        .ok_or(TypesError::EmptyBlock {
            number: block.number(),
        })?;
    let payload = Envelope::decode(raw)?.payload()?;

    let header = payload.header.channel_header;
    if header.header_type != HeaderType::Config {
        return Err(TypesError::Decode {
            what: "config block",
            reason: format!(
                "block {} carries a {} transaction",
                block.number(),
                header.header_type
            ),
        });
    }

    Ok((header.channel_id, ConfigEnvelope::decode(&payload.data)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderer_types::{last_config_index_from_block, ChannelGroup};

    #[test]
    fn genesis_round_trips_its_config() {
        let channel = ChannelId::from("mychannel");
        let config = Config {
            sequence: 0,
            channel: ChannelGroup::standard("solo"),
        };
        let block = genesis_block(&channel, config.clone()).unwrap();

        assert_eq!(block.number(), 0);
        assert_eq!(last_config_index_from_block(&block).unwrap(), 0);
        let (id, env) = config_envelope_from_block(&block).unwrap();
        assert_eq!(id, channel);
        assert_eq!(env.config, config);
    }

    #[test]
    fn empty_block_is_not_a_config_block() {
        let block = Block::new(3, vec![]);
        assert!(matches!(
            config_envelope_from_block(&block),
            Err(TypesError::EmptyBlock { number: 3 })
        ));
    }
}

//! Channel type definitions for pool update delivery

use tokio::sync::mpsc;

use super::types::PoolFields;

/// Default channel buffer size
pub const DEFAULT_CHANNEL_SIZE: usize = 1024;

/// Create a new pool update channel with the default buffer size
pub fn create_pool_update_channel() -> (mpsc::Sender<PoolFields>, mpsc::Receiver<PoolFields>) {
    mpsc::channel(DEFAULT_CHANNEL_SIZE)
}

/// Create a new pool update channel with a custom buffer size
pub fn create_pool_update_channel_with_size(
    size: usize,
) -> (mpsc::Sender<PoolFields>, mpsc::Receiver<PoolFields>) {
    mpsc::channel(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_channel_reports_full() {
        let (sender, mut receiver) = create_pool_update_channel_with_size(1);
        sender.try_send(PoolFields::new(1, 0)).unwrap();
        assert!(sender.try_send(PoolFields::new(2, 0)).is_err());

        let received = tokio_test::block_on(receiver.recv());
        assert_eq!(received, Some(PoolFields::new(1, 0)));
    }

    #[test]
    fn test_closed_channel_ends_stream() {
        let (sender, mut receiver) = create_pool_update_channel();
        drop(sender);
        assert_eq!(tokio_test::block_on(receiver.recv()), None);
    }
}

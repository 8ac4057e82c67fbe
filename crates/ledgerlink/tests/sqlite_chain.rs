//! End-to-end behaviour of a chain persisted in a SQLite file.

use ledgerlink::core::canonical::encode_transactions;
use ledgerlink::store::SqliteStore;
use ledgerlink::{
    BlockHash, Chain, ChainConfig, ChainError, Transaction, ValidationError, ViolationKind,
};

fn open_side_connection(path: &std::path::Path) -> rusqlite::Connection {
    rusqlite::Connection::open(path).unwrap()
}

#[tokio::test]
async fn append_lookup_and_corruption_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");

    let chain = Chain::open(SqliteStore::open(&path).unwrap(), ChainConfig::default())
        .await
        .unwrap();

    let genesis = chain.tip().await.unwrap();
    assert_eq!(genesis.previous_hash(), &BlockHash::ZERO);

    let block1 = chain
        .append_transactions(vec![Transaction::new("A", "B", 5.0)])
        .await
        .unwrap();
    assert_eq!(block1.index(), 1);
    assert_eq!(block1.previous_hash(), genesis.hash());

    assert_eq!(chain.all().await.unwrap(), vec![genesis.clone(), block1.clone()]);
    assert_eq!(chain.get_by_hash(block1.hash()).await.unwrap(), Some(block1.clone()));
    assert_eq!(chain.verify().await.unwrap(), 2);

    // Corrupt block 1's transactions behind the chain's back.
    let forged = encode_transactions(&[Transaction::new("A", "B", 500.0)]).unwrap();
    open_side_connection(&path)
        .execute(
            r#"UPDATE blocks SET transactions = ?1 WHERE "index" = 1"#,
            rusqlite::params![forged],
        )
        .unwrap();

    match chain.verify().await {
        Err(ChainError::Validation(v)) => {
            assert_eq!(v.kind(), ViolationKind::HashMismatch);
            assert_eq!(v.position(), 1);
        }
        other => panic!("expected hash mismatch, got {:?}", other),
    }
}

#[tokio::test]
async fn chain_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");

    let before = {
        let chain = Chain::open(SqliteStore::open(&path).unwrap(), ChainConfig::default())
            .await
            .unwrap();
        for i in 0..3 {
            chain
                .append_transactions(vec![Transaction::new("A", "B", f64::from(i))])
                .await
                .unwrap();
        }
        chain.all().await.unwrap()
    };

    let chain = Chain::open(SqliteStore::open(&path).unwrap(), ChainConfig::default())
        .await
        .unwrap();
    assert_eq!(chain.all().await.unwrap(), before);

    // Genesis is not recreated on reopen.
    assert_eq!(chain.get_by_index(0).await.unwrap(), Some(before[0].clone()));

    let next = chain.append_transactions(vec![]).await.unwrap();
    assert_eq!(next.index(), 4);
    assert_eq!(next.previous_hash(), before[3].hash());
}

#[tokio::test]
async fn open_refuses_corrupted_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");

    {
        let chain = Chain::open(SqliteStore::open(&path).unwrap(), ChainConfig::default())
            .await
            .unwrap();
        chain
            .append_transactions(vec![Transaction::new("A", "B", 1.0)])
            .await
            .unwrap();
        chain
            .append_transactions(vec![Transaction::new("B", "C", 1.0)])
            .await
            .unwrap();
    }

    open_side_connection(&path)
        .execute(
            r#"UPDATE blocks SET previous_hash = ?1 WHERE "index" = 2"#,
            rusqlite::params![vec![0x42u8; 32]],
        )
        .unwrap();

    match Chain::open(SqliteStore::open(&path).unwrap(), ChainConfig::default()).await {
        Err(ChainError::Validation(v)) => {
            assert_eq!(v.kind(), ViolationKind::BrokenLink);
            assert_eq!(v.position(), 2);
        }
        Err(other) => panic!("expected broken link, got {:?}", other),
        Ok(_) => panic!("corrupted chain opened"),
    }

    let lenient = ChainConfig {
        verify_on_open: false,
        ..ChainConfig::default()
    };
    let chain = Chain::open(SqliteStore::open(&path).unwrap(), lenient)
        .await
        .unwrap();
    assert_eq!(chain.len().await.unwrap(), 3);
}

#[tokio::test]
async fn undecodable_transactions_report_hash_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");

    let chain = Chain::open(SqliteStore::open(&path).unwrap(), ChainConfig::default())
        .await
        .unwrap();
    chain
        .append_transactions(vec![Transaction::new("A", "B", 5.0)])
        .await
        .unwrap();

    // 0xA0 is an empty CBOR map, not a transaction array.
    open_side_connection(&path)
        .execute(r#"UPDATE blocks SET transactions = X'A0' WHERE "index" = 1"#, [])
        .unwrap();

    match chain.verify().await {
        Err(ChainError::Validation(ValidationError::HashMismatch {
            position,
            computed,
            ..
        })) => {
            assert_eq!(position, 1);
            assert_eq!(computed, None);
        }
        other => panic!("expected hash mismatch, got {:?}", other),
    }
}

#[tokio::test]
async fn two_chains_on_one_file_stay_in_step() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");

    let server = Chain::open(SqliteStore::open(&path).unwrap(), ChainConfig::default())
        .await
        .unwrap();
    let cli = Chain::open(SqliteStore::open(&path).unwrap(), ChainConfig::default())
        .await
        .unwrap();
    assert_eq!(server.tip().await.unwrap(), cli.tip().await.unwrap());

    let b1 = cli
        .append_transactions(vec![Transaction::new("A", "B", 5.0)])
        .await
        .unwrap();

    assert_eq!(server.verify().await.unwrap(), 2);
    assert_eq!(server.len().await.unwrap(), 2);
    assert_eq!(server.all().await.unwrap().len(), 2);
    assert_eq!(server.get_by_hash(b1.hash()).await.unwrap(), Some(b1.clone()));

    let b2 = server.append_transactions(vec![]).await.unwrap();
    assert_eq!(b2.index(), 2);
    assert_eq!(b2.previous_hash(), b1.hash());

    assert_eq!(cli.tip().await.unwrap(), b2);
    assert_eq!(cli.verify().await.unwrap(), 3);
}

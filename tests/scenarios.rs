use anyhow::anyhow;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use statement_canon::{
    CategorizationStats, Category, Direction, Engine, Transaction, TransactionBuilder,
    UNCATEGORIZED,
};

fn batch(n: usize) -> Vec<Transaction> {
    (0..n)
        .map(|i| {
            TransactionBuilder::new()
                .id(format!("tx-{i}"))
                .date_str("2025-01-15")
                .amount(dec!(-10) - Decimal::from(i), "CHF")
                .payer("John Doe", "")
                .payee(format!("Shop {i}"), "")
                .build()
                .unwrap()
        })
        .collect()
}

#[test]
fn debit_resolved_from_negative_amount() {
    let tx = TransactionBuilder::new()
        .date_str("2025-01-15")
        .amount_str("-100.50", "CHF")
        .payer("John Doe", "")
        .payee("Acme Corp", "")
        .build()
        .unwrap();

    assert_eq!(tx.direction, Direction::Debit);
    assert_eq!(tx.debit, dec!(-100.50));
    assert_eq!(tx.credit, Decimal::ZERO);
    assert_eq!(tx.to_row()[13], "0.00");
    assert_eq!(tx.name, "Acme Corp");
}

#[test]
fn failing_categorizer_degrades_every_row() {
    let broken = |_: &str, _: bool, _: &str, _: &str, _: &str| -> anyhow::Result<Category> {
        Err(anyhow!("timeout"))
    };
    let mut engine = Engine::new("camt", Some(&broken));
    let mut txs = batch(5);
    let summary = engine.categorize_batch(&mut txs);

    assert_eq!(
        engine.stats,
        CategorizationStats {
            total: 5,
            successful: 0,
            failed: 5,
            uncategorized: 0,
        }
    );
    assert_eq!(summary.failed, 5);
    assert!(txs.iter().all(|t| t.category == UNCATEGORIZED));
}

#[test]
fn empty_category_names_count_as_uncategorized() {
    let blank = |_: &str, _: bool, _: &str, _: &str, _: &str| -> anyhow::Result<Category> {
        Ok(Category::default())
    };
    let mut engine = Engine::new("pdf", Some(&blank));
    let mut txs = batch(3);
    engine.categorize_batch(&mut txs);

    assert_eq!(engine.stats.total, 3);
    assert_eq!(engine.stats.uncategorized, 3);
    assert_eq!(engine.stats.failed, 0);
    assert_eq!(engine.stats.successful, 0);
}

#[test]
fn success_rate_of_ten() {
    let stats = CategorizationStats {
        total: 10,
        successful: 7,
        failed: 2,
        uncategorized: 1,
    };
    assert_eq!(stats.success_rate(), 70.0);
    assert_eq!(stats.summary("csv").success_rate, 70.0);
}

#[test]
fn no_categorizer_leaves_row_uncategorized() {
    let mut engine = Engine::new("csv", None);
    let mut txs = batch(1);
    txs[0].category = "Leftover".into();
    let summary = engine.categorize_batch(&mut txs);

    assert_eq!(txs[0].category, UNCATEGORIZED);
    assert_eq!(summary.uncategorized, 1);
    assert_eq!(summary.total_transactions, 1);
}

#[test]
fn conflicting_signals_resolve_to_one_direction() {
    // explicit credit code alongside a debit flag and a negative amount
    let tx = TransactionBuilder::new()
        .date_str("2025-01-15")
        .amount(dec!(-5), "EUR")
        .debit_flag(true)
        .credit_debit_code("CRDT")
        .build()
        .unwrap();
    assert!(tx.is_credit());
    assert!(!tx.is_debit());
    let row = tx.to_row();
    assert_eq!(row[10], "CRDT");
    assert_eq!(row[11], "false");
}

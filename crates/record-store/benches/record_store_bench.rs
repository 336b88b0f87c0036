use chrono::{Duration, TimeZone, Utc};
use criterion::{Criterion, criterion_group, criterion_main};
use record_store::{
    InMemoryStore, Transaction, TransactionFilter, TransactionStore, TransactionType,
};

fn make_transaction(n: i64) -> Transaction {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    Transaction {
        id: uuid::Uuid::new_v4().to_string(),
        amount: 100.0 + n as f64,
        transaction_date: start + Duration::hours(n),
        transaction_type: if n % 2 == 0 {
            TransactionType::Income
        } else {
            TransactionType::Expense
        },
        category_id: format!("category-{}", n % 5),
        property_id: Some(format!("property-{}", n % 3)),
        ..Default::default()
    }
}

fn seeded_store(rt: &tokio::runtime::Runtime, count: i64) -> InMemoryStore {
    let store = InMemoryStore::new();
    rt.block_on(async {
        for n in 0..count {
            store.create_transaction(make_transaction(n)).await.unwrap();
        }
    });
    store
}

fn bench_create_transaction(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryStore::new();
    let mut n = 0;

    c.bench_function("record_store/create_transaction", |b| {
        b.iter(|| {
            n += 1;
            rt.block_on(async {
                store.create_transaction(make_transaction(n)).await.unwrap();
            });
        });
    });
}

fn bench_list_first_page(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = seeded_store(&rt, 1_000);

    c.bench_function("record_store/list_first_page_1000", |b| {
        b.iter(|| {
            rt.block_on(async {
                store
                    .list_transactions(&TransactionFilter::new(), 20, 0)
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_list_filtered(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = seeded_store(&rt, 1_000);
    let filter = TransactionFilter::new()
        .property_id("property-1")
        .transaction_type(TransactionType::Expense)
        .start_date(Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap());

    c.bench_function("record_store/list_filtered_1000", |b| {
        b.iter(|| {
            rt.block_on(async {
                store.list_transactions(&filter, 50, 0).await.unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_create_transaction,
    bench_list_first_page,
    bench_list_filtered,
);
criterion_main!(benches);

//! Concurrent access tests
//!
//! Many tasks share one store handle. The connection mutex must serialise
//! them without losing writes or handing out duplicate ids.
//!
//! Run with: cargo test --test concurrent_access_test -- --nocapture

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;

use hainco_core::domain::ProductInput;
use hainco_core::{Error, HaincoContext};

/// Number of concurrent tasks
const TASK_COUNT: usize = 8;

/// Number of inserts per task
const ITERATIONS_PER_TASK: usize = 5;

fn product(code: String) -> ProductInput {
    ProductInput {
        product_name: "Turon".to_string(),
        product_price: Decimal::new(2000, 2),
        product_image_link: None,
        product_stock: 1,
        product_description: None,
        product_type: "snack".to_string(),
        product_is_active: true,
        product_code: code,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_inserts_share_one_store() {
    let ctx = Arc::new(HaincoContext::in_memory(b"concurrency").unwrap());

    let mut handles = Vec::new();
    for task in 0..TASK_COUNT {
        let ctx = Arc::clone(&ctx);
        handles.push(tokio::spawn(async move {
            for i in 0..ITERATIONS_PER_TASK {
                ctx.product_service
                    .create(product(format!("SNK-{}-{}", task, i)))
                    .await
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let products = ctx.product_service.list().await.unwrap();
    assert_eq!(products.len(), TASK_COUNT * ITERATIONS_PER_TASK);

    let ids: HashSet<i64> = products.iter().map(|p| p.product_id).collect();
    assert_eq!(ids.len(), products.len(), "duplicate ids handed out");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_duplicate_codes_admit_exactly_one() {
    let ctx = Arc::new(HaincoContext::in_memory(b"concurrency").unwrap());

    let mut handles = Vec::new();
    for _ in 0..TASK_COUNT {
        let ctx = Arc::clone(&ctx);
        handles.push(tokio::spawn(async move {
            ctx.product_service.create(product("SAME".to_string())).await
        }));
    }

    let mut created = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(Error::Conflict(_)) => conflicts += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(conflicts, TASK_COUNT - 1);
}

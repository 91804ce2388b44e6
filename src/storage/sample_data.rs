//! Development seed data
//!
//! Two cards with one paid and one pending statement each, dated around the
//! current month.

use anyhow::{Result, anyhow};
use chrono::{Datelike, Months, NaiveDate, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};

struct SampleCard {
    name: &'static str,
    last_four: &'static str,
    statement_day: u32,
    due_day: u32,
    days_until_due: i64,
    credit_limit: f64,
    paid_amount: f64,
    pending_amount: f64,
}

const SAMPLE_CARDS: [SampleCard; 2] = [
    SampleCard {
        name: "TD Aeroplan Visa",
        last_four: "9876",
        statement_day: 15,
        due_day: 10,
        days_until_due: 25,
        credit_limit: 5000.00,
        paid_amount: 1250.75,
        pending_amount: 892.50,
    },
    SampleCard {
        name: "Amex Cobalt",
        last_four: "1234",
        statement_day: 28,
        due_day: 23,
        days_until_due: 26,
        credit_limit: 10000.00,
        paid_amount: 2150.00,
        pending_amount: 3421.89,
    },
];

/// Insert the sample cards and statements unless they are already present
///
/// Returns `true` when data was inserted. The presence check and every
/// insert run in one transaction; any failure leaves the database untouched.
pub async fn load_sample_data(pool: &SqlitePool) -> Result<bool> {
    load_sample_data_as_of(pool, Utc::now().date_naive()).await
}

/// [`load_sample_data`] with statements dated relative to `today`
pub async fn load_sample_data_as_of(pool: &SqlitePool, today: NaiveDate) -> Result<bool> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| anyhow!("Failed to begin transaction: {}", e))?;

    let existing: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM credit_cards WHERE name IN ('TD Aeroplan Visa', 'Amex Cobalt')",
    )
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| anyhow!("Failed to check for existing sample data: {}", e))?;

    if existing > 0 {
        tracing::info!(cards = existing, "sample data already present, skipping");
        return Ok(false);
    }

    tracing::info!("loading sample data");
    let this_month = month_start(today)?;
    let last_month = shift_months(this_month, -1)?;
    let next_month = shift_months(this_month, 1)?;

    for card in &SAMPLE_CARDS {
        let card_id = insert_card(&mut tx, card).await?;

        insert_statement(
            &mut tx,
            card_id,
            on_day(last_month, card.statement_day)?,
            on_day(this_month, card.due_day)?,
            card.paid_amount,
            "paid",
            true,
        )
        .await?;
        insert_statement(
            &mut tx,
            card_id,
            on_day(this_month, card.statement_day)?,
            on_day(next_month, card.due_day)?,
            card.pending_amount,
            "pending",
            false,
        )
        .await?;
    }

    tx.commit()
        .await
        .map_err(|e| anyhow!("Failed to commit sample data: {}", e))?;

    tracing::info!(
        cards = SAMPLE_CARDS.len(),
        statements = SAMPLE_CARDS.len() * 2,
        "sample data loaded"
    );
    Ok(true)
}

async fn insert_card(tx: &mut Transaction<'_, Sqlite>, card: &SampleCard) -> Result<i64> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO credit_cards \
         (name, last_four, statement_day, days_until_due, credit_limit, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(card.name)
    .bind(card.last_four)
    .bind(i64::from(card.statement_day))
    .bind(card.days_until_due)
    .bind(card.credit_limit)
    .bind(now)
    .bind(now)
    .execute(&mut **tx)
    .await
    .map_err(|e| anyhow!("Failed to insert sample card {}: {}", card.name, e))?;

    Ok(result.last_insert_rowid())
}

async fn insert_statement(
    tx: &mut Transaction<'_, Sqlite>,
    card_id: i64,
    statement_date: NaiveDate,
    due_date: NaiveDate,
    amount: f64,
    status: &str,
    notified: bool,
) -> Result<()> {
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO statements \
         (card_id, statement_date, due_date, amount, status, \
          notified_statement, notified_payment, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(card_id)
    .bind(statement_date)
    .bind(due_date)
    .bind(amount)
    .bind(status)
    .bind(notified)
    .bind(notified)
    .bind(now)
    .bind(now)
    .execute(&mut **tx)
    .await
    .map_err(|e| anyhow!("Failed to insert sample statement for card {}: {}", card_id, e))?;

    Ok(())
}

fn month_start(date: NaiveDate) -> Result<NaiveDate> {
    date.with_day(1)
        .ok_or_else(|| anyhow!("Invalid month start for {}", date))
}

fn shift_months(month: NaiveDate, delta: i32) -> Result<NaiveDate> {
    let shifted = if delta >= 0 {
        month.checked_add_months(Months::new(delta.unsigned_abs()))
    } else {
        month.checked_sub_months(Months::new(delta.unsigned_abs()))
    };
    shifted.ok_or_else(|| anyhow!("Month out of range: {} {:+}", month, delta))
}

fn on_day(month: NaiveDate, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(month.year(), month.month(), day)
        .ok_or_else(|| anyhow!("Invalid sample date {}-{}-{}", month.year(), month.month(), day))
}

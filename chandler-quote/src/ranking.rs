use crate::models::Quote;

/// Recompute `price_rank` across one RFQ's quote set: ascending by
/// `total_amount`, ties broken by earliest `submitted_at`. Withdrawn and
/// expired quotes carry no rank. Runs whenever the quote set changes.
pub fn recompute_ranks(quotes: &mut [Quote]) {
    let mut order: Vec<usize> = (0..quotes.len())
        .filter(|&i| quotes[i].status.is_ranked() && quotes[i].submitted_at.is_some())
        .collect();
    order.sort_by(|&a, &b| {
        quotes[a]
            .total_amount
            .cmp(&quotes[b].total_amount)
            .then(quotes[a].submitted_at.cmp(&quotes[b].submitted_at))
    });

    for quote in quotes.iter_mut() {
        quote.price_rank = None;
    }
    for (rank, index) in order.into_iter().enumerate() {
        quotes[index].price_rank = Some(rank as u32 + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuoteStatus;
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn submitted(total_cents: i64, minutes_ago: i64) -> Quote {
        let mut quote = Quote::new(Uuid::new_v4(), Uuid::new_v4(), "USD".to_string());
        quote.status = QuoteStatus::Submitted;
        quote.total_amount = Decimal::new(total_cents, 2);
        quote.submitted_at = Some(Utc::now() - Duration::minutes(minutes_ago));
        quote
    }

    #[test]
    fn test_ascending_by_total() {
        let mut quotes = vec![submitted(12000, 10), submitted(10000, 5)];
        recompute_ranks(&mut quotes);
        assert_eq!(quotes[0].price_rank, Some(2));
        assert_eq!(quotes[1].price_rank, Some(1));
    }

    #[test]
    fn test_tie_broken_by_earliest_submission() {
        let mut quotes = vec![submitted(10000, 5), submitted(10000, 30)];
        recompute_ranks(&mut quotes);
        assert_eq!(quotes[0].price_rank, Some(2));
        assert_eq!(quotes[1].price_rank, Some(1));
    }

    #[test]
    fn test_withdrawn_quotes_are_unranked() {
        let mut quotes = vec![submitted(10000, 5), submitted(11000, 5)];
        quotes[0].status = QuoteStatus::Withdrawn;
        recompute_ranks(&mut quotes);
        assert_eq!(quotes[0].price_rank, None);
        assert_eq!(quotes[1].price_rank, Some(1));
    }
}

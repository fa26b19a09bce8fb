use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gridiron_core::batch::{simulate_batch, simulate_game, GameSetup};
use gridiron_core::resolver::{ChartResolver, DiceTableResolver, PlayResolver};
use gridiron_core::{GameBuilder, GameState, PlayCall, Side};
use playbook::data::{standard_catalog, standard_chart, standard_matchups};
use playbook::CardCatalog;

fn chart_resolver() -> Arc<dyn PlayResolver> {
    Arc::new(ChartResolver::new(Arc::new(standard_chart().unwrap())))
}

fn bench_resolve_down(c: &mut Criterion) {
    let catalog: Arc<CardCatalog> = Arc::new(standard_catalog().unwrap());
    let call = PlayCall::new(
        catalog.offense_card("pro-off-tackle").unwrap().clone(),
        catalog.defense_card("def-43-base").unwrap().clone(),
    );
    // Midfield first down, rebuilt each iteration so the game never ends
    let mut start = GameState::new(900);
    start.new_series(Side::Home, 50);

    c.bench_function("resolve_down", |b| {
        b.iter(|| {
            let mut game = GameBuilder::new()
                .catalog(Arc::clone(&catalog))
                .resolver(chart_resolver())
                .seed(1)
                .starting_state(start.clone())
                .build()
                .unwrap();
            black_box(game.resolve_down(black_box(&call)).unwrap())
        })
    });
}

fn bench_full_game(c: &mut Criterion) {
    let setup = GameSetup::new(Arc::new(standard_catalog().unwrap()), chart_resolver());
    let mut seed = 0u64;

    c.bench_function("full_game_chart", |b| {
        b.iter(|| {
            seed += 1;
            black_box(simulate_game(&setup, seed).unwrap())
        })
    });
}

fn bench_dice_table_batch(c: &mut Criterion) {
    let book = Arc::new(standard_matchups().unwrap());
    let fallback = ChartResolver::new(Arc::new(standard_chart().unwrap()));
    let resolver = DiceTableResolver::new(Arc::clone(&book)).with_fallback(Box::new(fallback));
    let setup = GameSetup::new(Arc::new(standard_catalog().unwrap()), Arc::new(resolver))
        .with_book(book);

    c.bench_function("batch_16_dice_table", |b| {
        b.iter(|| black_box(simulate_batch(&setup, 16, 0).unwrap()))
    });
}

criterion_group!(benches, bench_resolve_down, bench_full_game, bench_dice_table_batch);
criterion_main!(benches);

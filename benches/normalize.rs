use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use cfb_analytics::cfbd_client::{ApiGame, ApiPlay};
use cfb_analytics::normalize::{
    classify_drive_result, classify_play_type, game_row_from_api, game_row_from_csv,
    parse_loose_int_list, play_row_from_api, split_csv_line,
};

static GAMES_JSON: &str = include_str!("../tests/fixtures/games.json");
static PLAYS_JSON: &str = include_str!("../tests/fixtures/plays.json");

const CSV_LINE: &str = "401628455,2024,1,regular,2024-08-31,true,false,false,83712,\
    \"Gaylord Family Oklahoma Memorial Stadium\",Oklahoma,SEC,51,\"'[14, 16, 14, 7]'\",\
    Temple,American Athletic,3,\"'[3, 0, 0, 0]'\",1.304";

const PLAY_TYPES: &[&str] = &[
    "Rush",
    "Pass Reception",
    "Pass Incompletion",
    "Sack",
    "Pass Interception Return",
    "Fumble Recovery (Opponent)",
    "Punt",
    "Kickoff",
    "Field Goal Good",
    "Penalty",
    "Timeout",
    "End Period",
];

const DRIVE_RESULTS: &[&str] = &[
    "TD", "FG", "MISSED FG", "PUNT", "INT", "INT TD", "FUMBLE", "TURNOVER ON DOWNS",
    "END OF HALF", "END OF GAME", "SF", "Uncategorized",
];

fn bench_csv_split(c: &mut Criterion) {
    c.bench_function("csv_split", |b| {
        b.iter(|| {
            let fields = split_csv_line(black_box(CSV_LINE));
            black_box(fields.len());
        })
    });
}

fn bench_csv_game_row(c: &mut Criterion) {
    c.bench_function("csv_game_row", |b| {
        b.iter(|| {
            let row = game_row_from_csv(black_box(CSV_LINE)).unwrap();
            black_box(row.game_id);
        })
    });
}

fn bench_loose_list(c: &mut Criterion) {
    c.bench_function("loose_int_list", |b| {
        b.iter(|| {
            let scores = parse_loose_int_list(black_box("'[14, 16, 14, 7]'"));
            black_box(scores.map(|s| s.len()));
        })
    });
}

fn bench_classifiers(c: &mut Criterion) {
    c.bench_function("classify_play_types", |b| {
        b.iter(|| {
            for raw in PLAY_TYPES {
                black_box(classify_play_type(Some(black_box(raw))));
            }
        })
    });
    c.bench_function("classify_drive_results", |b| {
        b.iter(|| {
            for raw in DRIVE_RESULTS {
                black_box(classify_drive_result(Some(black_box(raw))));
            }
        })
    });
}

fn bench_api_game_parse(c: &mut Criterion) {
    c.bench_function("api_game_parse", |b| {
        b.iter(|| {
            let games: Vec<ApiGame> = serde_json::from_str(black_box(GAMES_JSON)).unwrap();
            let rows: Vec<_> = games.iter().filter_map(|g| game_row_from_api(g).ok()).collect();
            black_box(rows.len());
        })
    });
}

fn bench_api_play_parse(c: &mut Criterion) {
    c.bench_function("api_play_parse", |b| {
        b.iter(|| {
            let plays: Vec<ApiPlay> = serde_json::from_str(black_box(PLAYS_JSON)).unwrap();
            let rows: Vec<_> = plays.iter().filter_map(|p| play_row_from_api(p).ok()).collect();
            black_box(rows.len());
        })
    });
}

criterion_group!(
    normalize,
    bench_csv_split,
    bench_csv_game_row,
    bench_loose_list,
    bench_classifiers,
    bench_api_game_parse,
    bench_api_play_parse
);
criterion_main!(normalize);

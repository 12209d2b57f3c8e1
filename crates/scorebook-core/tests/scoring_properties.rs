//! Behavioral properties of the scoring engine.

use scorebook_core::domain::cricket::Player;
use scorebook_core::{
    add_player, apply_delivery, current_batsman, overs_from_balls, switch_innings, Delivery,
    Innings, Match, MatchSetup, PlayerId, TeamSide,
};

fn new_match() -> Match {
    Match::new(MatchSetup {
        team_a: "Royals".to_string(),
        team_b: "Strikers".to_string(),
        ..Default::default()
    })
}

fn with_batsmen(names: &[&str]) -> (Match, Vec<PlayerId>) {
    let mut m = new_match();
    let ids = names
        .iter()
        .map(|n| add_player(&mut m, TeamSide::A, n))
        .collect();
    (m, ids)
}

#[test]
fn non_boundary_legal_balls_never_touch_fours_or_sixes() {
    for runs in [0u32, 1, 2, 3, 5] {
        let (mut m, ids) = with_batsmen(&["Opener"]);
        let before: Player = m.team_a.players[0].clone();

        apply_delivery(&mut m, TeamSide::A, &ids[0], Delivery::runs(runs));

        let after = &m.team_a.players[0];
        assert_eq!(after.balls, before.balls + 1, "runs = {runs}");
        assert_eq!(after.fours, before.fours);
        assert_eq!(after.sixes, before.sixes);
    }
}

#[test]
fn four_and_six_increment_exactly_once() {
    let (mut m, ids) = with_batsmen(&["Opener"]);
    apply_delivery(&mut m, TeamSide::A, &ids[0], Delivery::runs(4));
    assert_eq!(m.team_a.players[0].fours, 1);
    assert_eq!(m.team_a.players[0].sixes, 0);

    apply_delivery(&mut m, TeamSide::A, &ids[0], Delivery::runs(6));
    assert_eq!(m.team_a.players[0].fours, 1);
    assert_eq!(m.team_a.players[0].sixes, 1);
}

#[test]
fn team_overs_exact_for_first_300_balls() {
    let (mut m, ids) = with_batsmen(&["Opener", "Partner"]);

    assert_eq!(m.team_a.overs, 0.0);
    for n in 1..=300u32 {
        // Alternate batsmen so the total comes from more than one player.
        let batsman = &ids[(n % 2) as usize];
        apply_delivery(&mut m, TeamSide::A, batsman, Delivery::runs(0));

        let expected = f64::from(n / 6) + f64::from(n % 6) / 10.0;
        assert_eq!(m.team_a.overs, expected, "after {n} balls");
        assert_eq!(m.team_a.overs, overs_from_balls(n));
    }
}

#[test]
fn overs_boundaries_at_five_and_six_balls() {
    let (mut m, ids) = with_batsmen(&["Opener"]);
    for _ in 0..5 {
        apply_delivery(&mut m, TeamSide::A, &ids[0], Delivery::runs(1));
    }
    assert_eq!(m.team_a.overs, 0.5);
    apply_delivery(&mut m, TeamSide::A, &ids[0], Delivery::runs(1));
    assert_eq!(m.team_a.overs, 1.0);
}

#[test]
fn double_switch_restores_innings() {
    let mut m = new_match();
    let original = m.current_innings;
    switch_innings(&mut m);
    assert_ne!(m.current_innings, original);
    switch_innings(&mut m);
    assert_eq!(m.current_innings, original);
}

#[test]
fn switch_keeps_both_records() {
    let (mut m, ids) = with_batsmen(&["Opener"]);
    apply_delivery(&mut m, TeamSide::A, &ids[0], Delivery::runs(3));
    let team_a = m.team_a.clone();

    switch_innings(&mut m);
    assert_eq!(m.current_innings, Innings::Second);
    assert_eq!(m.team_a, team_a);
    assert_eq!(m.batting_side(), TeamSide::B);
}

#[test]
fn score_sums_runs_with_or_without_extras() {
    let runs = [1u32, 4, 0, 6, 2];
    for extras_mask in 0u8..32 {
        let (mut m, ids) = with_batsmen(&["Opener"]);
        for (i, r) in runs.iter().enumerate() {
            let delivery = if extras_mask & (1 << i) != 0 {
                Delivery::extra(*r)
            } else {
                Delivery::runs(*r)
            };
            apply_delivery(&mut m, TeamSide::A, &ids[0], delivery);
        }
        assert_eq!(m.team_a.score, 13, "extras mask {extras_mask:05b}");
    }
}

#[test]
fn wicket_with_single_not_out_player_leaves_no_batsman() {
    let (mut m, ids) = with_batsmen(&["Out already", "Last"]);
    m.team_a.players[0].is_out = true;
    m.team_a.wickets = 1;

    let outcome = apply_delivery(&mut m, TeamSide::A, &ids[1], Delivery::wicket());

    assert_eq!(outcome.next_batsman, None);
    assert_eq!(m.team_a.wickets, 2);
    assert!(current_batsman(&m.team_a).is_none());
}

#[test]
fn add_player_to_empty_roster() {
    let mut m = new_match();
    assert!(m.team_b.players.is_empty());

    let id = add_player(&mut m, TeamSide::B, "  Keeper ");

    assert_eq!(m.team_b.players.len(), 1);
    let p = &m.team_b.players[0];
    assert_eq!(p.id, id);
    assert_eq!(p.name, "Keeper");
    assert_eq!((p.runs, p.balls, p.fours, p.sixes), (0, 0, 0, 0));
    assert!(!p.is_out);
}

#[test]
fn batting_other_side_leaves_first_team_alone() {
    let mut m = new_match();
    let a = add_player(&mut m, TeamSide::A, "A1");
    let b = add_player(&mut m, TeamSide::B, "B1");

    // A team A id is unknown on team B's roster.
    let outcome = apply_delivery(&mut m, TeamSide::B, &a, Delivery::runs(4));
    assert!(!outcome.applied);
    assert_eq!(m.team_b.score, 0);

    apply_delivery(&mut m, TeamSide::B, &b, Delivery::runs(4));
    assert_eq!(m.team_b.score, 4);
    assert_eq!(m.team_a.score, 0);
}

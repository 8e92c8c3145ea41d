use fishtank::{
    Direction, FishId, FishRecord, HoverRegistry, StaticHost, TankController, TankRules,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeSet, HashSet};

fn fish(ids: &[u64]) -> Vec<FishRecord> {
    ids.iter()
        .map(|&id| FishRecord::new(id, format!("fish-{id}"), (id * 37 % 360) as u16))
        .collect()
}

fn tank_with(rules: TankRules, width: u32, seed: u64) -> TankController<StdRng> {
    TankController::new(rules, width, HoverRegistry::new(), StdRng::seed_from_u64(seed))
}

fn tank(seed: u64) -> TankController<StdRng> {
    tank_with(TankRules::default(), 800, seed)
}

/// Rules with every placement draw pinned except direction.
fn pinned_rules(speed: u32) -> TankRules {
    TankRules {
        speed_min: speed,
        speed_max: speed,
        size_min: 40,
        size_max: 40,
        lane_min_pct: 50,
        lane_max_pct: 50,
        ..TankRules::default()
    }
}

/// First seed whose first spawn swims in `direction`.
fn tank_facing(
    direction: Direction,
    rules: TankRules,
    width: u32,
    id: u64,
) -> TankController<StdRng> {
    (0..1000)
        .map(|seed| {
            let mut t = tank_with(rules.clone(), width, seed);
            t.reconcile(&fish(&[id]));
            t
        })
        .find(|t| t.actors()[0].direction() == direction)
        .expect("no seed produced the wanted direction")
}

fn assert_membership_matches_actors(t: &TankController<StdRng>) {
    let actor_ids: Vec<FishId> = t.actors().iter().map(|a| a.fish_id()).collect();
    let unique: BTreeSet<FishId> = actor_ids.iter().copied().collect();
    assert_eq!(unique.len(), actor_ids.len(), "two actors share an id");
    let members: BTreeSet<FishId> = t.membership().iter().collect();
    assert_eq!(members, unique);
}

#[test]
fn first_reconcile_picks_exactly_one_of_two() {
    let mut t = tank(5);
    let spawned = t.reconcile(&fish(&[1, 2])).unwrap();
    assert!(spawned == FishId(1) || spawned == FishId(2));
    assert_eq!(t.membership().len(), 1);
    assert!(t.membership().contains(spawned));
}

#[test]
fn selection_between_two_fish_is_roughly_fair() {
    let trials = 2000;
    let ones = (0..trials)
        .filter(|&seed| tank(seed).reconcile(&fish(&[1, 2])) == Some(FishId(1)))
        .count();
    assert!(
        (800..=1200).contains(&ones),
        "fish 1 chosen {ones} times out of {trials}"
    );
}

#[test]
fn same_seed_same_spawn() {
    let snapshot = fish(&[1, 2, 3, 4, 5, 6]);
    let mut a = tank(77);
    let mut b = tank(77);
    for _ in 0..6 {
        assert_eq!(a.reconcile(&snapshot), b.reconcile(&snapshot));
    }
    let pa: Vec<_> = a.actors().iter().map(|x| x.placement()).collect();
    let pb: Vec<_> = b.actors().iter().map(|x| x.placement()).collect();
    assert_eq!(pa, pb);
}

#[test]
fn one_new_fish_per_cycle() {
    let mut t = tank(1);
    let snapshot = fish(&[1, 2, 3, 4]);
    for expected in 1..=4 {
        assert!(t.reconcile(&snapshot).is_some());
        assert_eq!(t.membership().len(), expected);
    }
    assert_eq!(t.reconcile(&snapshot), None);
    assert_eq!(t.actors().len(), 4);
}

#[test]
fn empty_snapshot_never_clears_the_tank() {
    let mut t = tank(2);
    t.reconcile(&fish(&[1]));
    t.reconcile(&fish(&[2, 1]));
    let before: Vec<FishId> = t.membership().iter().collect();

    assert_eq!(t.reconcile(&[]), None);
    let after: Vec<FishId> = t.membership().iter().collect();
    assert_eq!(before, after);
    assert_eq!(t.actors().len(), 2);
}

#[test]
fn missing_from_snapshot_is_not_removal() {
    let mut t = tank(3);
    t.reconcile(&fish(&[9]));
    t.reconcile(&fish(&[1, 2]));
    assert!(t.membership().contains(FishId(9)));
}

#[test]
fn later_record_with_changed_fields_is_same_fish() {
    let mut t = tank(4);
    let mut rec = FishRecord::new(3, "Gill", 10);
    rec.seconds_since_fed = Some(100);
    t.reconcile(&[rec.clone()]);

    rec.seconds_since_fed = Some(0);
    rec.name = "Gill (fed)".into();
    assert_eq!(t.reconcile(&[rec]), None);
    assert_eq!(t.actors().len(), 1);
}

#[test]
fn right_to_left_actor_is_removed_once_past_left_margin() {
    // born at width + 100 = 200, 10px per tick, removed at -200
    let mut t = tank_facing(Direction::RightToLeft, pinned_rules(10), 100, 1);
    assert_eq!(t.actors()[0].position(), 200.0);
    let host = StaticHost::visible(100);

    for _ in 0..39 {
        assert!(t.tick(&host).is_empty());
    }
    assert_eq!(t.actors()[0].position(), -190.0);

    assert_eq!(t.tick(&host), vec![FishId(1)]);
    assert!(t.actors().is_empty());
    assert!(t.membership().is_empty());

    for _ in 0..50 {
        assert!(t.tick(&host).is_empty());
    }
}

#[test]
fn left_to_right_actor_exits_past_right_margin() {
    // born at -100, removed at width + 200 = 500
    let mut t = tank_facing(Direction::LeftToRight, pinned_rules(20), 300, 1);
    let host = StaticHost::visible(300);
    let mut ticks = 0;
    let mut removed = Vec::new();
    while removed.is_empty() && ticks < 1000 {
        removed = t.tick(&host);
        ticks += 1;
    }
    assert_eq!(ticks, 30);
    assert_eq!(removed, vec![FishId(1)]);
}

#[test]
fn removed_fish_can_return_from_a_fresh_snapshot() {
    let mut t = tank_facing(Direction::RightToLeft, pinned_rules(50), 100, 1);
    let host = StaticHost::visible(100);
    while t.tick(&host).is_empty() {}
    assert!(!t.membership().contains(FishId(1)));

    assert_eq!(t.reconcile(&fish(&[1])), Some(FishId(1)));
    assert_eq!(t.actors().len(), 1);
}

#[test]
fn hovering_freezes_and_unhovering_resumes_in_place() {
    let mut t = tank_facing(Direction::RightToLeft, pinned_rules(4), 800, 7);
    let host = StaticHost::visible(800);
    for _ in 0..10 {
        t.tick(&host);
    }
    let frozen = t.actors()[0].position();
    assert_eq!(frozen, 860.0);

    // the list view holds its own handle to the same registry
    let list_view = t.hover().clone();
    list_view.set_hover(Some(FishId(7)));
    for _ in 0..25 {
        t.tick(&host);
        assert_eq!(t.actors()[0].position(), frozen);
        assert!(t.actors()[0].nametag_visible());
    }
    assert!(t.drawables(None)[0].show_nametag);

    list_view.set_hover(None);
    t.tick(&host);
    assert_eq!(t.actors()[0].position(), frozen - 4.0);
    assert!(!t.actors()[0].nametag_visible());
}

#[test]
fn hover_on_another_fish_does_not_hold_this_one() {
    let mut t = tank_facing(Direction::LeftToRight, pinned_rules(5), 800, 1);
    t.hover().set_hover(Some(FishId(99)));
    t.tick(&StaticHost::visible(800));
    assert_eq!(t.actors()[0].position(), -95.0);
}

#[test]
fn hidden_page_pauses_without_jump() {
    let mut t = tank_facing(Direction::LeftToRight, pinned_rules(6), 800, 1);
    let shown = StaticHost::visible(800);
    let hidden = StaticHost {
        visible: false,
        width: 800,
    };
    t.tick(&shown);
    t.tick(&shown);
    assert_eq!(t.actors()[0].position(), -88.0);

    for _ in 0..100 {
        assert!(t.tick(&hidden).is_empty());
    }
    assert_eq!(t.actors()[0].position(), -88.0);

    t.tick(&shown);
    assert_eq!(t.actors()[0].position(), -82.0);
}

#[test]
fn growing_the_viewport_keeps_a_parked_fish_off_screen() {
    let mut t = tank_facing(Direction::RightToLeft, pinned_rules(3), 400, 1);
    assert_eq!(t.actors()[0].position(), 500.0);
    assert!(t.tick(&StaticHost::visible(1000)).is_empty());
    // re-parked at 1100, then one step
    assert_eq!(t.actors()[0].position(), 1097.0);
    assert_eq!(t.membership().len(), 1);
}

#[test]
fn shrinking_the_viewport_mid_flight_removes_nothing() {
    let mut t = tank_facing(Direction::RightToLeft, pinned_rules(10), 1000, 1);
    let wide = StaticHost::visible(1000);
    for _ in 0..30 {
        assert!(t.tick(&wide).is_empty());
    }
    assert_eq!(t.actors()[0].position(), 800.0);

    let narrow = StaticHost::visible(400);
    assert!(t.tick(&narrow).is_empty());
    assert_eq!(t.membership().len(), 1);
    assert_eq!(t.actors()[0].position(), 790.0);

    // still leaves through the left margin: 790 -> -200 in 99 more ticks
    let mut ticks = 0;
    while t.tick(&narrow).is_empty() {
        ticks += 1;
    }
    assert_eq!(ticks, 98);
    assert!(t.membership().is_empty());
}

#[test]
fn explicit_retire_goes_through_the_engine() {
    let mut t = tank(8);
    t.reconcile(&fish(&[4]));
    assert!(t.retire(FishId(4)));
    assert!(!t.retire(FishId(4)));
    assert!(t.membership().is_empty());
    assert!(t.actors().is_empty());
}

#[test]
fn randomized_sequences_keep_one_actor_per_id() {
    for seed in 0..40u64 {
        let mut driver = StdRng::seed_from_u64(seed ^ 0xF15B);
        let rules = TankRules {
            speed_min: 20,
            speed_max: 60,
            ..TankRules::default()
        };
        let mut t = tank_with(rules, 320, seed);
        let view = t.hover().clone();
        let mut removals: Vec<FishId> = Vec::new();
        let mut spawns: Vec<FishId> = Vec::new();

        for _ in 0..400 {
            match driver.gen_range(0..10) {
                0..=3 => {
                    let ids: Vec<u64> = (0..12).filter(|_| driver.gen_bool(0.4)).collect();
                    let mut snapshot = fish(&ids);
                    for rec in &mut snapshot {
                        rec.dead = driver.gen_bool(0.05);
                    }
                    let before: HashSet<FishId> = t.membership().iter().collect();
                    removals.extend(t.apply_deaths(&snapshot));
                    if let Some(id) = t.reconcile(&snapshot) {
                        assert!(snapshot.iter().any(|r| r.id == id));
                        assert!(!before.contains(&id) || removals.contains(&id));
                        assert!(!t.actors().is_empty());
                        spawns.push(id);
                    }
                }
                4 => {
                    let hover = driver.gen_bool(0.5).then(|| FishId(driver.gen_range(0..12)));
                    view.set_hover(hover);
                }
                5 => {
                    let id = FishId(driver.gen_range(0..12));
                    if t.retire(id) {
                        removals.push(id);
                    }
                }
                _ => {
                    let host = StaticHost {
                        visible: driver.gen_bool(0.9),
                        width: if driver.gen_bool(0.05) { 200 } else { 320 },
                    };
                    let members: HashSet<FishId> = t.membership().iter().collect();
                    for id in t.tick(&host) {
                        assert!(members.contains(&id), "{id} removed while not in tank");
                        removals.push(id);
                    }
                }
            }
            assert_membership_matches_actors(&t);
        }

        // every removal matches an earlier spawn, and each spawn yields at most one removal
        for id in 0..12 {
            let id = FishId(id);
            let spawned = spawns.iter().filter(|&&s| s == id).count();
            let removed = removals.iter().filter(|&&r| r == id).count();
            let live = t.membership().contains(id) as usize;
            assert_eq!(spawned, removed + live, "seed {seed}, fish {id}");
        }
    }
}

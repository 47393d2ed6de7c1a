use seabattle::Rules;

#[test]
fn default_rules_describe_the_classic_fleet() {
    let rules = Rules::default();
    assert_eq!(rules.board_size, 10);
    assert_eq!(rules.ships_per_size, vec![4, 3, 2, 1]);
    assert_eq!(rules.fleet_cells(), rules.max_health);
}

#[test]
fn rules_load_from_a_json_file() {
    let path = std::env::temp_dir().join("seabattle_test_rules_ok.json");
    std::fs::write(
        &path,
        r#"{"board_size": 6, "max_health": 3, "ships_per_size": [1, 1]}"#,
    )
    .unwrap();
    let rules = Rules::from_file(&path).unwrap();
    assert_eq!(rules.board_size, 6);
    assert_eq!(rules.max_health, 3);
    std::fs::remove_file(&path).ok();
}

#[test]
fn mismatched_fleet_and_health_are_rejected() {
    let path = std::env::temp_dir().join("seabattle_test_rules_bad.json");
    std::fs::write(
        &path,
        r#"{"board_size": 10, "max_health": 5, "ships_per_size": [4, 3, 2, 1]}"#,
    )
    .unwrap();
    assert!(Rules::from_file(&path).is_err());
    std::fs::remove_file(&path).ok();
}

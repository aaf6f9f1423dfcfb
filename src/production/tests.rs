#[cfg(test)]
mod production_tests {
    use crate::command::group;
    use crate::lexer::tokenize;
    use crate::production::{extract, NameCounter, ProductionKind, ProductionRegistry, SigElem};

    fn first_command(source: &str) -> crate::command::Command {
        let tokens = tokenize(source).tokens;
        group(&tokens).into_iter().next().expect("a command")
    }

    #[test]
    fn simple_statement_production() {
        let cmd = first_command("block greet < string name > :\n\tprint name\n");
        let mut counter = NameCounter::new();
        let prod = extract(&cmd, &mut counter);
        assert_eq!(prod.name, "F1");
        assert_eq!(prod.return_type, None);
        assert_eq!(prod.kind, ProductionKind::Statement);
        assert_eq!(prod.signature.len(), 2);
        assert!(matches!(&prod.signature[0], SigElem::Literal(l) if l == "greet"));
        match &prod.signature[1] {
            SigElem::Hole(p) => {
                assert_eq!(p.type_name, "string");
                assert_eq!(p.alias, "name");
                assert!(!p.indirect);
            }
            _ => panic!("expected a hole"),
        }
    }

    #[test]
    fn indirect_parameter_marks_pointer() {
        let cmd = first_command("func touch < int * target > : int\n\treturn target\n");
        let mut counter = NameCounter::new();
        let prod = extract(&cmd, &mut counter);
        match &prod.signature[1] {
            SigElem::Hole(p) => {
                assert_eq!(p.type_name, "int");
                assert_eq!(p.alias, "target");
                assert!(p.indirect);
            }
            _ => panic!("expected a hole"),
        }
        assert_eq!(prod.return_type, Some("int".to_string()));
    }

    #[test]
    fn main_keeps_its_name() {
        let cmd = first_command("main :\n\treturn\n");
        let mut counter = NameCounter::new();
        let prod = extract(&cmd, &mut counter);
        assert_eq!(prod.name, "main");
    }

    #[test]
    fn counter_increments_across_declarations() {
        let mut counter = NameCounter::new();
        assert_eq!(counter.next(), "F1");
        assert_eq!(counter.next(), "F2");
        assert_eq!(counter.next(), "F3");
    }

    #[test]
    fn single_mismatched_parameter_registers_as_cast() {
        let cmd = first_command("func < int n > : string\n\treturn n\n");
        let mut counter = NameCounter::new();
        let prod = extract(&cmd, &mut counter);
        assert_eq!(prod.kind, ProductionKind::Cast);
    }

    #[test]
    fn single_matching_type_parameter_is_not_a_cast() {
        let cmd = first_command("func identity < int n > : int\n\treturn n\n");
        let mut counter = NameCounter::new();
        let prod = extract(&cmd, &mut counter);
        assert_eq!(prod.kind, ProductionKind::Expression);
    }

    #[test]
    fn registry_splits_casts_from_ordinary_productions() {
        let mut registry = ProductionRegistry::new();
        let mut counter = NameCounter::new();

        let cast_cmd = first_command("func < int n > : string\n\treturn n\n");
        registry.register(extract(&cast_cmd, &mut counter));

        let string_prod_cmd = first_command("func shout < string s > : string\n\treturn s\n");
        registry.register(extract(&string_prod_cmd, &mut counter));

        let candidates = registry.production_list("int");
        assert_eq!(candidates.len(), 1);
        assert_eq!(registry.get(candidates[0]).name, "F2");
    }

    #[test]
    fn statements_are_keyed_under_no_return_type() {
        let mut registry = ProductionRegistry::new();
        let mut counter = NameCounter::new();
        let cmd = first_command("block say < string s > :\n\tprint s\n");
        registry.register(extract(&cmd, &mut counter));
        assert_eq!(registry.statements().len(), 1);
    }
}

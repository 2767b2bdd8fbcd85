//! Accessor (`get_<field>`) and mutator (`set_<field>`) resolution.

use objmap::{MapError, Mapper, MapperConfig, Reflect};

#[derive(Reflect, Clone, Default)]
#[reflect(accessors(get_name, get_id))]
struct UserDto {
    id: isize,
    #[reflect(skip)]
    with_getter_name: String,
}

impl UserDto {
    fn new(id: isize, name: &str) -> Self {
        Self {
            id,
            with_getter_name: name.to_string(),
        }
    }

    fn get_name(&self) -> String {
        format!("Mr. {}", self.with_getter_name)
    }

    fn get_id(&self) -> isize {
        self.id
    }
}

#[derive(Reflect, Clone, Default)]
struct User {
    id: isize,
    name: String,
}

#[test]
fn accessor_fills_missing_field() {
    let dto = UserDto::new(1, "John");
    let mut user = User::default();
    Mapper::new().map(&dto, &mut user).unwrap();
    assert_eq!(user.id, 1);
    assert_eq!(user.name, "Mr. John");
}

#[derive(Reflect, Clone, Default)]
#[reflect(mutators(set_id, set_name))]
struct UserWithSetter {
    #[reflect(skip)]
    with_setter_id: isize,
    #[reflect(skip)]
    with_setter_name: String,
}

impl UserWithSetter {
    fn set_id(&mut self, id: isize) {
        self.with_setter_id = id;
    }

    fn set_name(&mut self, name: String) {
        self.with_setter_name = name;
    }
}

#[test]
fn mutators_receive_fields_and_accessors() {
    let dto = UserDto::new(1, "John");
    let mut user = UserWithSetter::default();
    Mapper::new().map(&dto, &mut user).unwrap();
    assert_eq!(user.with_setter_id, 1);
    assert_eq!(user.with_setter_name, dto.get_name());
}

#[derive(Reflect, Clone, Default)]
#[reflect(mutators(set_id, set_name))]
struct UserWithDifferentSetter {
    #[reflect(skip)]
    with_setter_id: isize,
    #[reflect(skip)]
    with_setter_name: String,
}

impl UserWithDifferentSetter {
    fn set_id(&mut self, id: i64) {
        self.with_setter_id = id as isize;
    }

    fn set_name(&mut self, name: String) {
        self.with_setter_name = name;
    }
}

#[test]
fn mutator_parameter_mismatch_stops_the_pass() {
    let dto = UserDto::new(1, "John");
    let mut user = UserWithDifferentSetter::default();
    let err = Mapper::new().map(&dto, &mut user).unwrap_err();
    assert!(err.is_type_mismatch());
    assert_eq!(user.with_setter_id, 0);
    assert_eq!(user.with_setter_name, "");
}

#[derive(Reflect, Clone, Default)]
#[reflect(mutators(set_id, set_name))]
struct UserWithGetterAndSetter {
    #[reflect(skip)]
    id: isize,
    #[reflect(skip)]
    name: String,
}

impl UserWithGetterAndSetter {
    fn set_id(&mut self, id: isize) {
        self.id = id;
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

#[test]
fn accessor_feeds_mutator() {
    let dto = UserDto::new(7, "John");
    let mut user = UserWithGetterAndSetter::default();
    Mapper::new().map(&dto, &mut user).unwrap();
    assert_eq!(user.id, dto.get_id());
    assert_eq!(user.name, dto.get_name());
}

#[derive(Reflect, Clone, Default)]
#[reflect(mutators(set_id))]
struct UserWithOneSetter {
    #[reflect(skip)]
    with_setter_id: isize,
}

impl UserWithOneSetter {
    fn set_id(&mut self, id: isize) {
        self.with_setter_id = id;
    }
}

#[test]
fn mutator_without_backing_field() {
    let dto = UserDto::new(1, "John");
    let mut user = UserWithOneSetter::default();
    Mapper::new().map(&dto, &mut user).unwrap();
    assert_eq!(user.with_setter_id, 1);
}

#[derive(Reflect, Clone, Default)]
#[reflect(mutators(set_nickname))]
struct UserWithNickname {
    #[reflect(skip)]
    nickname: String,
}

impl UserWithNickname {
    fn set_nickname(&mut self, nickname: String) {
        self.nickname = nickname;
    }
}

#[test]
fn mutator_without_source_is_an_error() {
    let dto = UserDto::new(1, "John");
    let mut user = UserWithNickname::default();
    let err = Mapper::new().map(&dto, &mut user).unwrap_err();
    let MapError::FieldNotFound(ref name) = err else {
        panic!("expected FieldNotFound, got {err:?}");
    };
    assert!(name.ends_with(": nickname"));
    assert!(name.contains("UserWithNickname"));
    assert_eq!(
        err.to_string(),
        format!("field not found: {}: nickname", std::any::type_name::<UserWithNickname>())
    );
    assert!(user.nickname.is_empty());
}

#[derive(Reflect, Clone, Default)]
#[reflect(accessors(get_val))]
struct SrcWithGetter {}

impl SrcWithGetter {
    fn get_val(&self) -> isize {
        42
    }
}

#[derive(Reflect, Clone, Default)]
#[reflect(mutators(set_val))]
struct DstWithSetter {
    #[reflect(skip)]
    val: usize,
}

impl DstWithSetter {
    fn set_val(&mut self, v: String) {
        self.val = v.len();
    }
}

#[test]
fn accessor_and_mutator_types_must_agree() {
    let mut dst = DstWithSetter::default();
    let err = Mapper::new().map(&SrcWithGetter {}, &mut dst).unwrap_err();
    assert!(err.is_type_mismatch());
    assert_eq!(dst.val, 0);
}

#[derive(Reflect, Clone, Default)]
#[reflect(accessors(read_title), mutators(write_title))]
struct Article {
    #[reflect(skip)]
    title: String,
}

impl Article {
    fn read_title(&self) -> String {
        self.title.clone()
    }

    fn write_title(&mut self, title: String) {
        self.title = title.to_uppercase();
    }
}

#[test]
fn prefixes_are_configurable() {
    let cfg = MapperConfig {
        accessor_prefix: "read_".to_string(),
        mutator_prefix: "write_".to_string(),
        ..MapperConfig::default()
    };
    let mapper = Mapper::with_config(cfg).unwrap();

    let src = Article {
        title: "hello".to_string(),
    };
    let mut dst = Article::default();
    // Identical types are copied wholesale, so go through a distinct source.
    #[derive(Reflect, Clone, Default)]
    struct Draft {
        title: String,
    }
    mapper
        .map(&Draft { title: src.read_title() }, &mut dst)
        .unwrap();
    assert_eq!(dst.title, "HELLO");

    let mut draft = Draft::default();
    mapper.map(&src, &mut draft).unwrap();
    assert_eq!(draft.title, "hello");
}

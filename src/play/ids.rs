use rand::Rng;

/// Short room code: three uppercase letters then three digits. Callers
/// regenerate on collision against the live registry.
pub fn room_code() -> String {
    let mut rng = rand::rng();
    let mut code = String::with_capacity(6);
    for _ in 0..3 {
        code.push(rng.random_range(b'A'..=b'Z') as char);
    }
    for _ in 0..3 {
        code.push(char::from_digit(rng.random_range(0..10), 10).expect("digit"));
    }
    code
}

pub fn game_id() -> String {
    format!("g-{}-{:08x}", crate::now_ms(), rand::rng().random::<u32>())
}

pub fn player_id() -> String {
    format!("p-{:012x}", rand::rng().random::<u64>() & 0xffff_ffff_ffff)
}

pub fn socket_id() -> String {
    format!("s-{:012x}", rand::rng().random::<u64>() & 0xffff_ffff_ffff)
}

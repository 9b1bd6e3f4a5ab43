/// Architectural registers. Each fits the 5-bit register operand field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg {
    // function arguments
    A0,
    A1,
    A2,
    A3,
    A4,
    A5,
    A6,
    A7,
    // general purpose
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    R8,
    R9,
    R10,
    R11,
    R12,
    R13,
    R14,
    R15,
    // jump address
    Jr,
    // program counter
    Pc,
    // return value
    RetVal,
    // return address
    RetAddr,
    // stack pointer
    Sp,
    // condition register
    Cr,
    // hardware interface pair
    RtcLo,
    RtcHi,
}

const ALL: [Reg; 32] = [
    Reg::A0,
    Reg::A1,
    Reg::A2,
    Reg::A3,
    Reg::A4,
    Reg::A5,
    Reg::A6,
    Reg::A7,
    Reg::R0,
    Reg::R1,
    Reg::R2,
    Reg::R3,
    Reg::R4,
    Reg::R5,
    Reg::R6,
    Reg::R7,
    Reg::R8,
    Reg::R9,
    Reg::R10,
    Reg::R11,
    Reg::R12,
    Reg::R13,
    Reg::R14,
    Reg::R15,
    Reg::Jr,
    Reg::Pc,
    Reg::RetVal,
    Reg::RetAddr,
    Reg::Sp,
    Reg::Cr,
    Reg::RtcLo,
    Reg::RtcHi,
];

/// Canonical lowercase names, indexed by register number.
pub const REGISTER_NAMES: [&str; 32] = [
    "a0", "a1", "a2", "a3", "a4", "a5", "a6", "a7", "r0", "r1", "r2", "r3", "r4", "r5", "r6",
    "r7", "r8", "r9", "r10", "r11", "r12", "r13", "r14", "r15", "jr", "pc", "retval", "retaddr",
    "sp", "cr", "rtclo", "rtchi",
];

impl Reg {
    pub fn index(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        REGISTER_NAMES[self as usize]
    }

    pub fn from_index(idx: u32) -> Option<Reg> {
        ALL.get(idx as usize).copied()
    }

    pub fn from_name(name: &str) -> Option<Reg> {
        REGISTER_NAMES
            .iter()
            .position(|&n| n == name)
            .map(|i| ALL[i])
    }
}

/// Values the condition register takes after `cmpr`/`cmpi`; the `jmpeq`
/// macro family encodes these as the `jmpcr` immediate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cond {
    Equal = 0,
    Less = 1,
    LessOrEqual = 2,
    Greater = 3,
    GreaterOrEqual = 4,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_stable() {
        assert_eq!(Reg::A0.index(), 0);
        assert_eq!(Reg::R0.index(), 8);
        assert_eq!(Reg::R15.index(), 23);
        assert_eq!(Reg::Jr.index(), 24);
        assert_eq!(Reg::Pc.index(), 25);
        assert_eq!(Reg::RetAddr.index(), 27);
        assert_eq!(Reg::RtcHi.index(), 31);
    }

    #[test]
    fn name_round_trip() {
        for idx in 0..32u32 {
            let reg = Reg::from_index(idx).unwrap();
            assert_eq!(Reg::from_name(reg.name()), Some(reg));
            assert_eq!(reg.index(), idx);
        }
        assert_eq!(Reg::from_name("r16"), None);
        assert_eq!(Reg::from_name("R0"), None); // names are lowercase
    }
}

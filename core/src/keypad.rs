/// Snapshot of the 16 key hex keypad. Bit `i` set means key `i` is held down.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Keys(pub u16);

impl Keys {
    pub const NONE: Keys = Keys(0);

    pub fn is_down(&self, key: u8) -> bool {
        self.0 & (1 << (key & 0x0F)) != 0
    }

    /// Lowest numbered key currently held, if any
    pub fn lowest_down(&self) -> Option<u8> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0.trailing_zeros() as u8)
        }
    }

    pub fn press(&mut self, key: u8) {
        self.0 |= 1 << (key & 0x0F);
    }

    pub fn release(&mut self, key: u8) {
        self.0 &= !(1 << (key & 0x0F));
    }
}

impl From<u16> for Keys {
    fn from(mask: u16) -> Self {
        Keys(mask)
    }
}

/// Whether the interpreter fetches instructions or is parked on FX0A
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ExecState {
    Running,
    /// Next key press is stored in `register`
    WaitingForKey { register: usize },
}

impl ExecState {
    /// Resolve a pending wait against the current keys. Returns the register
    /// and key to store once a key is held, and moves back to `Running`.
    pub fn resolve(&mut self, keys: Keys) -> Option<(usize, u8)> {
        match *self {
            ExecState::Running => None,
            ExecState::WaitingForKey { register } => {
                let key = keys.lowest_down()?;
                *self = ExecState::Running;
                Some((register, key))
            }
        }
    }
}

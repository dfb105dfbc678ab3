//! Exact fixed-point token amounts.
//!
//! `Amount` wraps a `rust_decimal::Decimal` (96-bit mantissa, up to 28
//! fractional digits). Addition, subtraction and power-of-ten scaling are
//! exact. Products and quotients that do not fit are truncated toward zero,
//! never rounded.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::ZwapError;
use crate::types::Balance;

/// Fractional digits kept by [`Amount::checked_div`].
pub const DIVISION_SCALE: u32 = 18;

/// Largest scale a `Decimal` can carry.
const MAX_SCALE: u32 = Decimal::MAX_SCALE;

/// Largest mantissa a `Decimal` can carry (2^96 - 1).
const MAX_MANTISSA: u128 = (1 << 96) - 1;

#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);
    pub const ONE_HUNDRED: Amount = Amount(Decimal::ONE_HUNDRED);

    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn from_integer(n: u64) -> Self {
        Self(Decimal::from(n))
    }

    /// `bps / 10_000`, e.g. 500 bps = 0.05.
    pub fn from_bps(bps: u32) -> Self {
        Self(Decimal::new(i64::from(bps), 4).normalize())
    }

    /// Interpret `units` as an integer count of `10^-decimals`.
    pub fn from_base_units(units: Balance, decimals: u32) -> Result<Self, ZwapError> {
        let mantissa = i128::try_from(units)
            .map_err(|_| ZwapError::Arithmetic(format!("{units} base units out of range")))?;
        Decimal::try_from_i128_with_scale(mantissa, decimals)
            .map(Self)
            .map_err(|e| ZwapError::Arithmetic(format!("{units}e-{decimals}: {e}")))
    }

    /// Exact conversion to base units. Fails on negative values or on
    /// fractional digits beyond `decimals`.
    pub fn to_base_units(&self, decimals: u32) -> Result<Balance, ZwapError> {
        if self.is_negative() {
            return Err(ZwapError::Arithmetic(format!(
                "negative amount {self} has no base-unit form"
            )));
        }
        let scaled = self.scale_by(decimals as i32)?;
        if !scaled.0.fract().is_zero() {
            return Err(ZwapError::Arithmetic(format!(
                "{self} has more than {decimals} fractional digits"
            )));
        }
        let mut whole = scaled.0.trunc();
        whole.rescale(0);
        u128::try_from(whole.mantissa())
            .map_err(|_| ZwapError::Arithmetic(format!("{self} overflows base units")))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn checked_add(self, rhs: Amount) -> Result<Amount, ZwapError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or_else(|| overflow("add", self, rhs))
    }

    /// May go negative; callers check [`Amount::is_negative`].
    pub fn checked_sub(self, rhs: Amount) -> Result<Amount, ZwapError> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or_else(|| overflow("subtract", self, rhs))
    }

    /// Exact when the product fits a `Decimal`; otherwise the low-order
    /// digits of the full product are truncated until it does.
    pub fn checked_mul(self, rhs: Amount) -> Result<Amount, ZwapError> {
        if self.is_zero() || rhs.is_zero() {
            return Ok(Self::ZERO);
        }
        let a = self.0.normalize();
        let b = rhs.0.normalize();
        let negative = a.is_sign_negative() != b.is_sign_negative();

        let mut wide = mul_wide(a.mantissa().unsigned_abs(), b.mantissa().unsigned_abs());
        let mut scale = a.scale() + b.scale();
        let mantissa = loop {
            match narrow(&wide) {
                Some(m) if scale <= MAX_SCALE => break m,
                _ if scale == 0 => return Err(overflow("multiply", self, rhs)),
                _ => {
                    div_small(&mut wide, 10);
                    scale -= 1;
                }
            }
        };
        signed(mantissa, negative, scale).ok_or_else(|| overflow("multiply", self, rhs))
    }

    /// Quotient truncated toward zero at [`DIVISION_SCALE`] digits, or at
    /// the last digit that still fits when the integer part is large.
    pub fn checked_div(self, rhs: Amount) -> Result<Amount, ZwapError> {
        if rhs.is_zero() {
            return Err(ZwapError::Arithmetic(format!("{self} / 0: division by zero")));
        }
        if self.is_zero() {
            return Ok(Self::ZERO);
        }
        let a = self.0.normalize();
        let b = rhs.0.normalize();
        let negative = a.is_sign_negative() != b.is_sign_negative();
        let den = b.mantissa().unsigned_abs();
        let num = a.mantissa().unsigned_abs();

        // value = quotient * 10^-(exp + digits)
        let exp = i64::from(a.scale()) - i64::from(b.scale());
        let target = i64::from(DIVISION_SCALE);
        let mut quotient = num / den;
        let mut rem = num % den;
        let mut digits = 0i64;
        while exp + digits < target && (rem != 0 || exp + digits < 0) {
            let next = rem * 10;
            let candidate = quotient * 10 + next / den;
            if candidate > MAX_MANTISSA {
                if exp + digits >= 0 {
                    break;
                }
                return Err(overflow("divide", self, rhs));
            }
            quotient = candidate;
            rem = next % den;
            digits += 1;
        }

        let scale = u32::try_from(exp + digits).map_err(|_| overflow("divide", self, rhs))?;
        let value = signed(quotient, negative, scale).ok_or_else(|| overflow("divide", self, rhs))?;
        Ok(value.truncate(DIVISION_SCALE))
    }

    /// Multiply by `10^exp`. Exact unless a negative shift would push past 28
    /// fractional digits, in which case the excess is truncated.
    pub fn scale_by(self, exp: i32) -> Result<Amount, ZwapError> {
        let mut value = self.0;
        let scale = value.scale();
        if exp >= 0 {
            let exp = exp as u32;
            if exp <= scale {
                value
                    .set_scale(scale - exp)
                    .map_err(|e| ZwapError::Arithmetic(e.to_string()))?;
                return Ok(Self(value));
            }
            value
                .set_scale(0)
                .map_err(|e| ZwapError::Arithmetic(e.to_string()))?;
            let factor = pow10(exp - scale)
                .ok_or_else(|| ZwapError::Arithmetic(format!("10^{exp} out of range")))?;
            return value
                .checked_mul(factor)
                .map(Self)
                .ok_or_else(|| ZwapError::Arithmetic(format!("{self} * 10^{exp} overflows")));
        }

        let shift = exp.unsigned_abs();
        if shift > MAX_SCALE {
            return Ok(Self::ZERO);
        }
        if scale + shift > MAX_SCALE {
            value = value.round_dp_with_strategy(MAX_SCALE - shift, RoundingStrategy::ToZero);
        }
        let new_scale = value.scale() + shift;
        value
            .set_scale(new_scale)
            .map_err(|e| ZwapError::Arithmetic(e.to_string()))?;
        Ok(Self(value))
    }

    /// Drop fractional digits beyond `dp`.
    pub fn truncate(self, dp: u32) -> Amount {
        Self(self.0.round_dp_with_strategy(dp, RoundingStrategy::ToZero))
    }

    /// Display form with thousands separators and exactly `dp` decimals
    /// (truncated), e.g. `1234567.891` at 2 → `1,234,567.89`.
    pub fn format_dp(&self, dp: u32) -> String {
        let truncated = self.truncate(dp).0;
        let plain = format!("{:.*}", dp as usize, truncated.abs());
        let (int_part, frac_part) = match plain.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (plain.as_str(), None),
        };

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let sign = if truncated.is_sign_negative() && !truncated.is_zero() {
            "-"
        } else {
            ""
        };
        match frac_part {
            Some(f) => format!("{sign}{grouped}.{f}"),
            None => format!("{sign}{grouped}"),
        }
    }
}

fn pow10(n: u32) -> Option<Decimal> {
    (0..n).try_fold(Decimal::ONE, |acc, _| acc.checked_mul(Decimal::TEN))
}

fn signed(mantissa: u128, negative: bool, scale: u32) -> Option<Amount> {
    let m = i128::try_from(mantissa).ok()?;
    let m = if negative { -m } else { m };
    Decimal::try_from_i128_with_scale(m, scale).ok().map(Amount)
}

/// Full 192-bit product of two 96-bit mantissas, little-endian limbs.
fn mul_wide(a: u128, b: u128) -> [u64; 4] {
    let a = [a as u64, (a >> 64) as u64];
    let b = [b as u64, (b >> 64) as u64];
    let mut out = [0u64; 4];
    for i in 0..2 {
        let mut carry = 0u128;
        for j in 0..2 {
            let t = u128::from(a[i]) * u128::from(b[j]) + u128::from(out[i + j]) + carry;
            out[i + j] = t as u64;
            carry = t >> 64;
        }
        out[i + 2] = carry as u64;
    }
    out
}

/// In-place truncating division.
fn div_small(limbs: &mut [u64; 4], divisor: u64) {
    let mut rem = 0u128;
    for limb in limbs.iter_mut().rev() {
        let cur = (rem << 64) | u128::from(*limb);
        *limb = (cur / u128::from(divisor)) as u64;
        rem = cur % u128::from(divisor);
    }
}

fn narrow(limbs: &[u64; 4]) -> Option<u128> {
    if limbs[2] != 0 || limbs[3] != 0 {
        return None;
    }
    let value = (u128::from(limbs[1]) << 64) | u128::from(limbs[0]);
    (value <= MAX_MANTISSA).then_some(value)
}

fn overflow(op: &str, lhs: Amount, rhs: Amount) -> ZwapError {
    ZwapError::Arithmetic(format!("{op} overflow: {lhs}, {rhs}"))
}

impl From<u64> for Amount {
    fn from(n: u64) -> Self {
        Self::from_integer(n)
    }
}

impl FromStr for Amount {
    type Err = ZwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str_exact(s.trim())
            .map(Self)
            .map_err(|e| ZwapError::Arithmetic(format!("parsing amount {s:?}: {e}")))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({})", self.0.normalize())
    }
}

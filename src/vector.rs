//! Products of vector operators in spherical-tensor form.
use super::error::{Error, Result};
use super::half::Half;
use super::scalar::Scalar;
use super::tensor::Expr;

fn check_vector(e: &Expr) -> Result<()> {
    for (_, t) in e.terms() {
        if t.rank() != Half::from(1) {
            return Err(Error::NotAVector { rank: t.rank() });
        }
    }
    Ok(())
}

/// `a · b = √3 [a × b]^0`
pub fn scalar_product<A, B>(a: A, b: B) -> Result<Expr>
    where A: Into<Expr>, B: Into<Expr>
{
    let (a, b) = (a.into(), b.into());
    check_vector(&a)?;
    check_vector(&b)?;
    Ok(a.couple(&b, 0)?.scale(&Scalar::sqrt(3)))
}

/// `a × b = −i √2 [a × b]^1`
pub fn vector_product<A, B>(a: A, b: B) -> Result<Expr>
    where A: Into<Expr>, B: Into<Expr>
{
    let (a, b) = (a.into(), b.into());
    check_vector(&a)?;
    check_vector(&b)?;
    let coeff = -(Scalar::imag() * Scalar::sqrt(2));
    Ok(a.couple(&b, 1)?.scale(&coeff))
}

/// `[a × b]^k`
pub fn tensor_product<A, B>(a: A, b: B, k: u16) -> Result<Expr>
    where A: Into<Expr>, B: Into<Expr>
{
    a.into().couple(&b.into(), k)
}
